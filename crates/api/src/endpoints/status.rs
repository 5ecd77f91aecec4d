//! `GET /status`: deployment information baked in at definition time.

use serde_json::json;

use restkit_core::{FunctionConfig, LambdaFunction};
use restkit_openapi::RouteMetadata;

use crate::handlers::status::STATUS_INFO_ENV;
use crate::models::status_response;
use crate::resources::Resources;

pub const OPERATION_ID: &str = "getStatus";
pub const REST_SIGNATURE: &str = "GET /status";
pub const ENTRY_POINT: &str = "status-handler";

fn grant_permissions(function: &mut LambdaFunction, resources: &Resources) {
    resources.grant_read(function);
}

pub fn status_info(deployment_time: &str) -> String {
    json!({ "deploymentTime": deployment_time }).to_string()
}

pub fn metadata(deployment_time: &str) -> RouteMetadata<Resources> {
    RouteMetadata::new(OPERATION_ID, REST_SIGNATURE, ENTRY_POINT)
        .with_lambda_config(FunctionConfig::default().with_env(STATUS_INFO_ENV, status_info(deployment_time)))
        .with_grants(grant_permissions)
        .with_response(super::json_response(status_response()))
}
