//! Route metadata for every endpoint the API serves.

use restkit_openapi::{MethodResponse, ModelSpec, RouteMetadata};

use crate::resources::Resources;

pub mod openapi_spec;
pub mod status;

/// `200` with a JSON body described by `model`, plus the CORS headers.
pub(crate) fn json_response(model: ModelSpec) -> MethodResponse {
    MethodResponse::new(200)
        .with_header("Content-Type", true)
        .with_header("Access-Control-Allow-Origin", true)
        .with_header("Access-Control-Allow-Credentials", true)
        .with_model("application/json", model)
}

/// All endpoints, in registration order.
pub fn all(deployment_time: &str) -> Vec<RouteMetadata<Resources>> {
    vec![status::metadata(deployment_time), openapi_spec::metadata()]
}
