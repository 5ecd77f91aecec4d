//! Proxy-integration response envelope shared by every handler.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const CONTENT_TYPE: &str = "application/json";

/// Headers every response carries so browsers can call the API.
pub const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Headers", "Authorization, content-type"),
    ("Access-Control-Allow-Methods", "*"),
];

/// HTTP status codes the handlers answer with.
pub mod http_status {
    pub const SUCCESS: u16 = 200;
    pub const CREATED: u16 = 201;
    pub const ACCEPTED: u16 = 202;
    pub const NO_CONTENT: u16 = 204;
    pub const CLIENT_ERROR: u16 = 400;
    pub const CLIENT_UNAUTHORIZED: u16 = 401;
    pub const CLIENT_FORBIDDEN: u16 = 403;
    pub const NOT_FOUND: u16 = 404;
    pub const METHOD_NOT_ALLOWED: u16 = 405;
    pub const CONFLICT: u16 = 409;
    pub const UNPROCESSABLE_ENTITY: u16 = 422;
    pub const TOO_MANY_REQUESTS: u16 = 429;
    pub const SERVER_ERROR: u16 = 500;
    pub const NOT_IMPLEMENTED: u16 = 501;
    pub const BAD_GATEWAY: u16 = 502;
    pub const SERVICE_UNAVAILABLE: u16 = 503;
    pub const GATEWAY_TIMEOUT: u16 = 504;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub status_code: u16,
    pub body: String,
    pub headers: BTreeMap<String, String>,
}

/// The subset of the proxy event the handlers read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProxyRequest {
    pub path: Option<String>,
    pub http_method: Option<String>,
    pub request_context: RequestContext,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestContext {
    pub api_id: Option<String>,
    pub stage: Option<String>,
    pub request_id: Option<String>,
}

/// JSON response with the CORS header set.
pub fn lambda_response(status_code: u16, body: impl Into<String>) -> ProxyResponse {
    let mut headers: BTreeMap<String, String> = CORS_HEADERS
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();
    headers.insert("content-type".to_string(), CONTENT_TYPE.to_string());

    ProxyResponse {
        status_code,
        body: body.into(),
        headers,
    }
}
