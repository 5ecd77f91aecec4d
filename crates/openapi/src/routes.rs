//! Route metadata: one declarative descriptor per endpoint.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde_json::Value;

use restkit_core::{BuildError, BuildResult, FunctionConfig, LambdaFunction};

/// The verbs a REST signature may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 4] = [Self::Get, Self::Post, Self::Put, Self::Delete];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    fn supported_keys() -> String {
        Self::ALL.map(Self::as_str).join(", ")
    }
}

/// Case-sensitive, like the signature grammar.
impl FromStr for HttpMethod {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            other => Err(BuildError::UnsupportedMethod {
                method: other.to_string(),
                supported: Self::supported_keys(),
            }),
        }
    }
}

impl core::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split a `"{METHOD} {path}"` signature on its first space.
///
/// Paths are kept verbatim: case-sensitive, no trailing-slash folding.
pub fn parse_signature(signature: &str) -> BuildResult<(HttpMethod, String)> {
    let (method, path) = signature.split_once(' ').unwrap_or((signature, ""));
    let method = method.parse::<HttpMethod>()?;
    if !path.starts_with('/') {
        return Err(BuildError::invalid_path(path));
    }
    Ok((method, path.to_string()))
}

/// A JSON-schema model declaration, resolved to a resource on registration.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSpec {
    pub schema_id: String,
    pub schema: Value,
}

impl ModelSpec {
    pub fn new(schema_id: impl Into<String>, schema: Value) -> Self {
        Self {
            schema_id: schema_id.into(),
            schema,
        }
    }
}

/// Declared response for one status code.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MethodResponse {
    pub status_code: String,
    /// `method.response.header.<Name>` → required
    pub response_parameters: BTreeMap<String, bool>,
    /// content type → model
    pub response_models: BTreeMap<String, ModelSpec>,
}

impl MethodResponse {
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code: status_code.to_string(),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, header: &str, required: bool) -> Self {
        self.response_parameters
            .insert(format!("method.response.header.{header}"), required);
        self
    }

    pub fn with_model(mut self, content_type: impl Into<String>, model: ModelSpec) -> Self {
        self.response_models.insert(content_type.into(), model);
        self
    }
}

/// Attaches per-route grants to the route's function.
///
/// Receives the shared resources so grants can name shared constructs.
pub type GrantFn<R> = fn(&mut LambdaFunction, &R);

/// Everything the composite needs to know about one endpoint.
///
/// Built once per endpoint while defining the stack and only read after.
pub struct RouteMetadata<R> {
    /// Unique across the API; becomes the method's operation name.
    pub operation_id: String,

    /// `"{METHOD} {path}"`, e.g. `"GET /status"` or `"DELETE /record/{recordId}"`.
    pub rest_signature: String,

    /// Handler binary packaged as the route's function.
    pub route_entry_point: String,

    pub lambda_config: FunctionConfig,

    pub grant_permissions: GrantFn<R>,

    /// `method.request.{querystring|path|header}.<name>` → required
    pub request_parameters: BTreeMap<String, bool>,

    /// content type → request body model
    pub method_request_models: BTreeMap<String, ModelSpec>,

    pub method_responses: Vec<MethodResponse>,
}

impl<R> RouteMetadata<R> {
    pub fn new(
        operation_id: impl Into<String>,
        rest_signature: impl Into<String>,
        route_entry_point: impl Into<String>,
    ) -> Self {
        Self {
            operation_id: operation_id.into(),
            rest_signature: rest_signature.into(),
            route_entry_point: route_entry_point.into(),
            lambda_config: FunctionConfig::default(),
            grant_permissions: |_, _| {},
            request_parameters: BTreeMap::new(),
            method_request_models: BTreeMap::new(),
            method_responses: Vec::new(),
        }
    }

    pub fn with_lambda_config(mut self, config: FunctionConfig) -> Self {
        self.lambda_config = config;
        self
    }

    pub fn with_grants(mut self, grant: GrantFn<R>) -> Self {
        self.grant_permissions = grant;
        self
    }

    pub fn with_request_parameter(mut self, parameter: impl Into<String>, required: bool) -> Self {
        self.request_parameters.insert(parameter.into(), required);
        self
    }

    pub fn with_request_model(mut self, content_type: impl Into<String>, model: ModelSpec) -> Self {
        self.method_request_models.insert(content_type.into(), model);
        self
    }

    pub fn with_response(mut self, response: MethodResponse) -> Self {
        self.method_responses.push(response);
        self
    }
}

impl<R> core::fmt::Debug for RouteMetadata<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RouteMetadata")
            .field("operation_id", &self.operation_id)
            .field("rest_signature", &self.rest_signature)
            .field("route_entry_point", &self.route_entry_point)
            .finish_non_exhaustive()
    }
}
