//! OpenAPI 3 description of the registered endpoints.
//!
//! The gateway exports an equivalent document once deployed; this one is
//! available at definition time, for CI artifacts and diffing.

use std::collections::BTreeMap;

use serde_json::{Map, Value, json};

use crate::endpoint::Endpoint;
use crate::model_factory::ModelHandle;
use crate::rest_api::RestApi;

pub const OPENAPI_VERSION: &str = "3.0.1";
pub const SECURITY_SCHEME: &str = "PrivateApiRequestAuthorizer";

const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Where a request parameter lives, from its `method.request.*` key.
fn parameter_location(key: &str) -> Option<(&'static str, &str)> {
    let rest = key.strip_prefix("method.request.")?;
    let (kind, name) = rest.split_once('.')?;
    let location = match kind {
        "path" => "path",
        "querystring" => "query",
        "header" => "header",
        _ => return None,
    };
    Some((location, name))
}

fn path_placeholders(path: &str) -> impl Iterator<Item = &str> {
    path.split('/')
        .filter_map(|segment| segment.strip_prefix('{')?.strip_suffix('}'))
        .map(|name| name.trim_end_matches('+'))
}

fn schema_ref(model: &ModelHandle) -> Value {
    json!({ "$ref": format!("{SCHEMA_REF_PREFIX}{}", model.name()) })
}

fn content(models: &BTreeMap<String, ModelHandle>) -> Value {
    let content: Map<String, Value> = models
        .iter()
        .map(|(content_type, model)| (content_type.clone(), json!({ "schema": schema_ref(model) })))
        .collect();
    Value::Object(content)
}

fn operation(endpoint: &Endpoint) -> Value {
    let options = endpoint.value.method_options();

    let mut parameters: Vec<Value> = Vec::new();
    let mut seen: Vec<(&str, &str)> = Vec::new();
    for name in path_placeholders(&endpoint.path) {
        seen.push(("path", name));
        parameters.push(json!({ "name": name, "in": "path", "required": true, "schema": { "type": "string" } }));
    }
    for (key, required) in &options.request_parameters {
        let Some((location, name)) = parameter_location(key) else {
            continue;
        };
        if seen.contains(&(location, name)) {
            continue;
        }
        seen.push((location, name));
        parameters.push(json!({
            "name": name,
            "in": location,
            "required": *required || location == "path",
            "schema": { "type": "string" },
        }));
    }

    let mut responses = Map::new();
    for response in &options.method_responses {
        let mut body = Map::new();
        body.insert("description".to_string(), json!(format!("{} response", response.status_code)));
        let headers: Map<String, Value> = response
            .response_parameters
            .keys()
            .filter_map(|key| key.strip_prefix("method.response.header."))
            .map(|header| (header.to_string(), json!({ "schema": { "type": "string" } })))
            .collect();
        if !headers.is_empty() {
            body.insert("headers".to_string(), Value::Object(headers));
        }
        if !response.response_models.is_empty() {
            body.insert("content".to_string(), content(&response.response_models));
        }
        responses.insert(response.status_code.clone(), Value::Object(body));
    }
    if responses.is_empty() {
        responses.insert("default".to_string(), json!({ "description": "Proxy integration response" }));
    }

    let mut operation = Map::new();
    operation.insert("operationId".to_string(), json!(endpoint.operation_id()));
    if !parameters.is_empty() {
        operation.insert("parameters".to_string(), Value::Array(parameters));
    }
    if !options.request_models.is_empty() {
        operation.insert(
            "requestBody".to_string(),
            json!({ "required": true, "content": content(&options.request_models) }),
        );
    }
    operation.insert("responses".to_string(), Value::Object(responses));
    operation.insert("security".to_string(), json!([{ SECURITY_SCHEME: [] }]));
    Value::Object(operation)
}

/// Render an OpenAPI document for `endpoints` and the `models` they use.
pub fn render<'a>(
    title: &str,
    description: &str,
    server_url: Option<&str>,
    endpoints: &[Endpoint],
    models: impl IntoIterator<Item = &'a ModelHandle>,
) -> Value {
    let mut paths: BTreeMap<&str, Map<String, Value>> = BTreeMap::new();
    for endpoint in endpoints {
        paths
            .entry(endpoint.path.as_str())
            .or_default()
            .insert(endpoint.http_method.as_str().to_lowercase(), operation(endpoint));
    }

    let schemas: Map<String, Value> = models
        .into_iter()
        .map(|model| {
            let mut schema = model.schema().clone();
            if let Some(object) = schema.as_object_mut() {
                object.remove("$schema");
            }
            (model.name().to_string(), schema)
        })
        .collect();

    let mut document = json!({
        "openapi": OPENAPI_VERSION,
        "info": { "title": title, "description": description, "version": "1" },
        "paths": paths,
        "components": {
            "schemas": schemas,
            "securitySchemes": {
                SECURITY_SCHEME: {
                    "type": "apiKey",
                    "name": "Authorization",
                    "in": "header",
                    "x-amazon-apigateway-authtype": "custom",
                }
            }
        },
    });
    if let Some(url) = server_url {
        document["servers"] = json!([{ "url": url }]);
    }
    document
}

impl<R> RestApi<R> {
    /// The OpenAPI document for everything registered so far.
    pub fn openapi_document(&self) -> Value {
        let server_url = self.vanity_domain().map(|domain| format!("https://{domain}"));
        render(
            self.name(),
            self.description(),
            server_url.as_deref(),
            self.endpoints(),
            self.models().models(),
        )
    }
}

#[cfg(test)]
mod tests {
    use restkit_core::{FunctionConfig, LambdaFunction, Resource, Stack};

    use super::*;
    use crate::endpoint::{OpenApiFunction, ResolvedMethodResponse};
    use crate::model_factory::ModelFactory;
    use crate::routes::HttpMethod;

    fn endpoint(stack: &mut Stack, method: HttpMethod, path: &str, operation_id: &str) -> Endpoint {
        let function = LambdaFunction::new(operation_id, "handler", FunctionConfig::default())
            .materialise(stack)
            .unwrap();
        Endpoint::new(method, path, OpenApiFunction::new(operation_id, function))
    }

    #[test]
    fn paths_group_methods_and_reference_models() {
        let mut stack = Stack::new("TestStack");
        let api = stack
            .add("Api", Resource::new("AWS::ApiGateway::RestApi", json!({})))
            .unwrap();
        let mut models = ModelFactory::new(api);
        let status = models
            .create(
                &mut stack,
                "StatusResponse",
                &json!({ "$schema": "http://json-schema.org/draft-07/schema#", "type": "object" }),
            )
            .unwrap();

        let mut get = endpoint(&mut stack, HttpMethod::Get, "/items/{itemId}", "getItem");
        get.value.add_method_response(ResolvedMethodResponse {
            status_code: "200".to_string(),
            response_parameters: BTreeMap::from([(
                "method.response.header.Access-Control-Allow-Origin".to_string(),
                true,
            )]),
            response_models: BTreeMap::from([("application/json".to_string(), status.clone())]),
        });
        get.value.add_request_parameter("method.request.querystring.verbose", false);
        let put = endpoint(&mut stack, HttpMethod::Put, "/items/{itemId}", "putItem");

        let doc = render("Items", "Item API", Some("https://items.example.com"), &[get, put], models.models());

        let item = &doc["paths"]["/items/{itemId}"];
        assert_eq!(item["get"]["operationId"], "getItem");
        assert_eq!(item["put"]["operationId"], "putItem");
        assert_eq!(item["get"]["parameters"][0]["in"], "path");
        assert_eq!(item["get"]["parameters"][1]["name"], "verbose");
        assert_eq!(
            item["get"]["responses"]["200"]["content"]["application/json"]["schema"]["$ref"],
            "#/components/schemas/StatusResponseModel"
        );
        assert!(item["put"]["responses"]["default"].is_object());
        assert_eq!(doc["components"]["schemas"]["StatusResponseModel"], json!({ "type": "object" }));
        assert_eq!(doc["servers"][0]["url"], "https://items.example.com");
    }

    #[test]
    fn placeholders_strip_greedy_marker() {
        let names: Vec<&str> = path_placeholders("/files/{proxy+}/{id}").collect();
        assert_eq!(names, vec!["proxy", "id"]);
    }

    #[test]
    fn unknown_parameter_kinds_are_ignored() {
        assert_eq!(parameter_location("method.request.querystring.q"), Some(("query", "q")));
        assert_eq!(parameter_location("method.request.body.x"), None);
        assert_eq!(parameter_location("integration.request.header.x"), None);
    }
}
