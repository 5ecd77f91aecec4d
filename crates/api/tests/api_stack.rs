use serde_json::json;

use restkit_api::{ApiStack, StackConfig, StackParameters};
use restkit_core::Template;
use restkit_openapi::domain::hosted_zone_context_key;

fn config() -> StackConfig {
    StackConfig {
        stack_name: "MyTestStack".to_string(),
        account: Some("1234567890".to_string()),
        region: Some("eu-west-2".to_string()),
        parameters: StackParameters {
            hosted_zone_domain: "dummy.domain.name".to_string(),
            service_data_bucket_name: "test-stack-stub-bucket-name".to_string(),
            ..StackParameters::default()
        },
        mock_time: Some("2024-01-01T00:00:00.000Z".to_string()),
        ..StackConfig::default()
    }
}

fn template() -> Template {
    ApiStack::build(&config()).unwrap().template()
}

#[test]
fn creates_rest_api_with_title_and_description() {
    assert!(template().has_resource_properties(
        "AWS::ApiGateway::RestApi",
        &json!({
            "Description": "Template API - https://github.com/connected-web/template-api",
            "Name": "Template API",
        })
    ));
}

#[test]
fn creates_method_for_get_status() {
    assert!(template().has_resource_properties(
        "AWS::ApiGateway::Method",
        &json!({ "OperationName": "getStatus", "HttpMethod": "GET" })
    ));
}

#[test]
fn creates_method_for_get_openapi_spec() {
    assert!(template().has_resource_properties(
        "AWS::ApiGateway::Method",
        &json!({ "OperationName": "getOpenAPISpec", "HttpMethod": "GET" })
    ));
}

#[test]
fn status_function_carries_deployment_time() {
    assert!(template().has_resource_properties(
        "AWS::Lambda::Function",
        &json!({
            "Environment": {
                "Variables": { "STATUS_INFO": r#"{"deploymentTime":"2024-01-01T00:00:00.000Z"}"# }
            }
        })
    ));
}

#[test]
fn registers_both_routes_and_the_shared_models() {
    let built = ApiStack::build(&config()).unwrap();

    assert!(built.api.failures().is_empty());
    let paths: Vec<&str> = built.api.route_tree().paths().collect();
    assert_eq!(paths, vec!["/", "/openapi", "/status"]);

    let template = built.template();
    for model in ["StatusResponseModel", "BasicObjectModel", "BasicArrayModel", "BasicStringArrayModel"] {
        assert!(
            template.has_resource_properties("AWS::ApiGateway::Model", &json!({ "Name": model })),
            "missing {model}"
        );
    }
    assert_eq!(template.count_of_type("AWS::ApiGateway::Model"), 4);

    let markdown = built.api.summary_markdown();
    assert!(markdown.contains("| getStatus | GET | /status |"));
    assert!(markdown.contains("| getOpenAPISpec | GET | /openapi |"));
}

#[test]
fn vanity_domain_is_opt_in() {
    let mut config = config();
    config.create_cname_record = true;
    assert!(ApiStack::build(&config).is_err());

    config
        .context
        .insert(hosted_zone_context_key("dummy.domain.name"), "Z0123456789".to_string());
    let built = ApiStack::build(&config).unwrap();
    assert_eq!(built.api.vanity_domain(), Some("template-api.dummy.domain.name"));
    assert_eq!(built.template().count_of_type("AWS::Route53::RecordSet"), 1);
}

#[test]
fn writes_template_and_openapi_preview() {
    let dir = tempfile::tempdir().unwrap();
    let built = ApiStack::build(&config()).unwrap();

    let written = built.write_outputs(dir.path()).unwrap();

    assert_eq!(written.len(), 2);
    let template: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&written[0]).unwrap()).unwrap();
    assert_eq!(template["Description"], "Template API - https://github.com/connected-web/template-api");

    let openapi: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&written[1]).unwrap()).unwrap();
    assert_eq!(openapi["paths"]["/status"]["get"]["operationId"], "getStatus");
    assert_eq!(
        openapi["paths"]["/status"]["get"]["responses"]["200"]["content"]["application/json"]["schema"]["$ref"],
        "#/components/schemas/StatusResponseModel"
    );
}
