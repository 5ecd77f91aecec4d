//! Export the live stage's OpenAPI document.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use serde_json::{Value, json};

use super::HandlerError;
use crate::response::{ProxyRequest, ProxyResponse, http_status, lambda_response};

pub const EXPORT_TYPE: &str = "oas30";

/// Source of stage exports.
#[async_trait]
pub trait ApiExporter: Send + Sync {
    async fn export(&self, rest_api_id: &str, stage_name: &str) -> Result<Vec<u8>, HandlerError>;
}

/// [`ApiExporter`] calling the gateway's `GetExport`.
#[derive(Debug, Clone)]
pub struct GatewayExporter {
    client: aws_sdk_apigateway::Client,
}

impl GatewayExporter {
    pub fn new(client: aws_sdk_apigateway::Client) -> Self {
        Self { client }
    }

    /// Client configured from the function's environment.
    pub async fn from_env() -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        Self::new(aws_sdk_apigateway::Client::new(&config))
    }
}

#[async_trait]
impl ApiExporter for GatewayExporter {
    async fn export(&self, rest_api_id: &str, stage_name: &str) -> Result<Vec<u8>, HandlerError> {
        let output = self
            .client
            .get_export()
            .rest_api_id(rest_api_id)
            .stage_name(stage_name)
            .export_type(EXPORT_TYPE)
            .accepts("application/json")
            .send()
            .await
            .map_err(|e| HandlerError::Export(e.to_string()))?;

        output.body.map(|body| body.into_inner()).ok_or(HandlerError::EmptyExport)
    }
}

async fn fetch(exporter: &dyn ApiExporter, request: &ProxyRequest) -> Result<Value, HandlerError> {
    let context = &request.request_context;
    let api_id = context.api_id.as_deref().ok_or(HandlerError::MissingContext("apiId"))?;
    let stage = context.stage.as_deref().ok_or(HandlerError::MissingContext("stage"))?;

    let body = exporter.export(api_id, stage).await?;
    Ok(serde_json::from_slice(&body)?)
}

/// The exported document, or an error envelope echoing the event.
///
/// Always `200`: the envelope is the failure signal.
pub async fn respond(exporter: &dyn ApiExporter, event: Value) -> ProxyResponse {
    let request: ProxyRequest = serde_json::from_value(event.clone()).unwrap_or_default();

    let body = match fetch(exporter, &request).await {
        Ok(spec) => {
            tracing::info!("Successfully generated Open API spec");
            spec
        }
        Err(e) => {
            tracing::warn!(error = %e, "Unable to generate Open API spec");
            json!({
                "message": "Unable to retrieve or decode OpenAPI Spec",
                "openapiSpec": Value::Null,
                "error": e.to_string(),
                "event": event,
            })
        }
    };

    lambda_response(http_status::SUCCESS, body.to_string())
}
