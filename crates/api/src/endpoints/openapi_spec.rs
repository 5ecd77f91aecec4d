//! `GET /openapi`: the deployed stage's exported OpenAPI document.

use serde_json::json;

use restkit_core::{LambdaFunction, PolicyStatement};
use restkit_openapi::RouteMetadata;
use restkit_openapi::basic_models::basic_object;

use crate::resources::Resources;

pub const OPERATION_ID: &str = "getOpenAPISpec";
pub const REST_SIGNATURE: &str = "GET /openapi";
pub const ENTRY_POINT: &str = "openapi-handler";

const STAGE_EXPORTS_ARN: &str = "arn:aws:apigateway:*::/restapis/*/stages/*/exports/*";

fn grant_permissions(function: &mut LambdaFunction, _resources: &Resources) {
    function.add_to_role_policy(
        PolicyStatement::allow()
            .action("apigateway:GET")
            .resource(json!(STAGE_EXPORTS_ARN)),
    );
}

pub fn metadata() -> RouteMetadata<Resources> {
    RouteMetadata::new(OPERATION_ID, REST_SIGNATURE, ENTRY_POINT)
        .with_grants(grant_permissions)
        .with_response(super::json_response(basic_object()))
}
