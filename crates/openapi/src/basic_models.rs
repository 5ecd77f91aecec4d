//! Shared models covering the common JSON response shapes.
//!
//! APIs declare their own models the same way: a [`ModelSpec`] with a
//! draft-07 schema, resolved through the composite's model factory.

use serde_json::json;

use restkit_core::{BuildResult, Stack};

use crate::model_factory::{ModelFactory, ModelHandle};
use crate::routes::ModelSpec;

pub const JSON_SCHEMA_DRAFT7: &str = "http://json-schema.org/draft-07/schema#";

/// Any JSON object.
pub fn basic_object() -> ModelSpec {
    ModelSpec::new(
        "BasicObject",
        json!({
            "$schema": JSON_SCHEMA_DRAFT7,
            "title": "Basic Object",
            "description": "A basic JSON object with key value pairs",
            "type": "object",
            "properties": {},
            "additionalProperties": true,
        }),
    )
}

/// An array of arbitrary objects.
pub fn basic_array() -> ModelSpec {
    ModelSpec::new(
        "BasicArray",
        json!({
            "$schema": JSON_SCHEMA_DRAFT7,
            "title": "Basic Array of Objects",
            "type": "array",
            "items": {
                "type": "object",
                "properties": {},
                "additionalProperties": true,
            },
        }),
    )
}

pub fn basic_string_array() -> ModelSpec {
    ModelSpec::new(
        "BasicStringArray",
        json!({
            "$schema": JSON_SCHEMA_DRAFT7,
            "title": "Basic Array of Strings",
            "type": "array",
            "items": { "type": "string" },
        }),
    )
}

/// Ensure all basic models exist on the API.
pub fn register(factory: &mut ModelFactory, stack: &mut Stack) -> BuildResult<Vec<ModelHandle>> {
    [basic_object(), basic_array(), basic_string_array()]
        .iter()
        .map(|spec| factory.create_spec(stack, spec))
        .collect()
}
