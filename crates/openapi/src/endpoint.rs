//! An HTTP method + path bound to a deployed function unit.

use std::collections::BTreeMap;

use serde_json::{Value, json};

use restkit_core::DeployedFunction;

use crate::model_factory::ModelHandle;
use crate::routes::HttpMethod;

/// A method response whose models are already registered.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMethodResponse {
    pub status_code: String,
    pub response_parameters: BTreeMap<String, bool>,
    pub response_models: BTreeMap<String, ModelHandle>,
}

/// Method-level options bound alongside the integration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodOptions {
    pub request_parameters: BTreeMap<String, bool>,
    pub request_models: BTreeMap<String, ModelHandle>,
    pub method_responses: Vec<ResolvedMethodResponse>,
}

impl MethodOptions {
    /// Method properties contributed by these options.
    pub fn to_properties(&self) -> serde_json::Map<String, Value> {
        let mut properties = serde_json::Map::new();
        if !self.request_parameters.is_empty() {
            properties.insert("RequestParameters".to_string(), json!(self.request_parameters));
        }
        if !self.request_models.is_empty() {
            let models: BTreeMap<&str, Value> = self
                .request_models
                .iter()
                .map(|(content_type, model)| (content_type.as_str(), model.reference()))
                .collect();
            properties.insert("RequestModels".to_string(), json!(models));
        }
        if !self.method_responses.is_empty() {
            let responses: Vec<Value> = self
                .method_responses
                .iter()
                .map(|response| {
                    let models: BTreeMap<&str, Value> = response
                        .response_models
                        .iter()
                        .map(|(content_type, model)| (content_type.as_str(), model.reference()))
                        .collect();
                    json!({
                        "StatusCode": response.status_code,
                        "ResponseParameters": response.response_parameters,
                        "ResponseModels": models,
                    })
                })
                .collect();
            properties.insert("MethodResponses".to_string(), Value::Array(responses));
        }
        properties
    }
}

/// A route's deployed function with its OpenAPI-facing options.
#[derive(Debug, Clone)]
pub struct OpenApiFunction {
    operation_id: String,
    function: DeployedFunction,
    method_options: MethodOptions,
}

impl OpenApiFunction {
    pub fn new(operation_id: impl Into<String>, function: DeployedFunction) -> Self {
        Self {
            operation_id: operation_id.into(),
            function,
            method_options: MethodOptions::default(),
        }
    }

    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    pub fn function(&self) -> &DeployedFunction {
        &self.function
    }

    pub fn method_options(&self) -> &MethodOptions {
        &self.method_options
    }

    pub fn add_method_response(&mut self, response: ResolvedMethodResponse) {
        self.method_options.method_responses.push(response);
    }

    pub fn add_request_model(&mut self, model: ModelHandle, content_type: impl Into<String>) {
        self.method_options.request_models.insert(content_type.into(), model);
    }

    pub fn add_request_parameter(&mut self, parameter: impl Into<String>, required: bool) {
        self.method_options.request_parameters.insert(parameter.into(), required);
    }
}

/// Created from route metadata and consumed once by the route tree.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub http_method: HttpMethod,
    pub path: String,
    pub value: OpenApiFunction,
}

impl Endpoint {
    pub fn new(http_method: HttpMethod, path: impl Into<String>, value: OpenApiFunction) -> Self {
        Self {
            http_method,
            path: path.into(),
            value,
        }
    }

    pub fn operation_id(&self) -> &str {
        self.value.operation_id()
    }
}
