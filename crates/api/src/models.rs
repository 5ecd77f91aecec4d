//! Response models specific to this API.

use serde_json::json;

use restkit_openapi::ModelSpec;
use restkit_openapi::basic_models::JSON_SCHEMA_DRAFT7;

pub fn status_response() -> ModelSpec {
    ModelSpec::new(
        "StatusResponse",
        json!({
            "$schema": JSON_SCHEMA_DRAFT7,
            "title": "Status",
            "type": "object",
            "properties": {
                "deploymentTime": {
                    "type": "string",
                    "description": "The UTC timestamp representing the last time the server was updated",
                }
            },
            "required": ["deploymentTime"],
        }),
    )
}
