//! Create-or-reuse cache of JSON-schema models.

use std::collections::BTreeMap;

use serde_json::{Value, json};

use restkit_core::{BuildError, BuildResult, LogicalId, Resource, ResourceRef, Stack};

use crate::routes::ModelSpec;

/// Appended to every schema id to form the model name.
pub const MODEL_SUFFIX: &str = "Model";

/// A model registered on the API.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelHandle {
    name: String,
    handle: ResourceRef,
    schema: Value,
}

impl ModelHandle {
    /// `{schemaId}Model`
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> &ResourceRef {
        &self.handle
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Evaluates to the model name.
    pub fn reference(&self) -> Value {
        self.handle.reference()
    }
}

/// At most one model resource per schema id, for the factory's lifetime.
///
/// The provider refuses two resources with the same name in one stack, so
/// every route that mentions `StatusResponse` must get the same model.
#[derive(Debug, Clone)]
pub struct ModelFactory {
    rest_api: ResourceRef,
    cache: BTreeMap<String, ModelHandle>,
}

impl ModelFactory {
    pub fn new(rest_api: ResourceRef) -> Self {
        Self {
            rest_api,
            cache: BTreeMap::new(),
        }
    }

    /// Return the cached model for `schema_id`, creating it on first use.
    ///
    /// The schema of later calls is ignored; the first registration wins.
    pub fn create(&mut self, stack: &mut Stack, schema_id: &str, schema: &Value) -> BuildResult<ModelHandle> {
        if let Some(model) = self.cache.get(schema_id) {
            return Ok(model.clone());
        }

        let model_name = format!("{schema_id}{MODEL_SUFFIX}");
        if schema_id.trim().is_empty() {
            return Err(BuildError::configuration("model schema id must not be empty"));
        }
        if schema_id.contains(MODEL_SUFFIX) {
            return Err(BuildError::configuration(format!(
                "ambiguous model name: avoid '{MODEL_SUFFIX}' in schema ids; model name will be suffixed with {MODEL_SUFFIX}: {schema_id} becomes {model_name}"
            )));
        }

        let handle = stack.add(
            LogicalId::from(model_name.as_str()),
            Resource::new(
                "AWS::ApiGateway::Model",
                json!({
                    "RestApiId": self.rest_api.reference(),
                    "ContentType": "application/json",
                    "Name": model_name,
                    "Schema": schema,
                }),
            ),
        )?;
        tracing::debug!(model = %model_name, "model registered");

        let model = ModelHandle {
            name: model_name,
            handle,
            schema: schema.clone(),
        };
        self.cache.insert(schema_id.to_string(), model.clone());
        Ok(model)
    }

    pub fn create_spec(&mut self, stack: &mut Stack, spec: &ModelSpec) -> BuildResult<ModelHandle> {
        self.create(stack, &spec.schema_id, &spec.schema)
    }

    pub fn get(&self, schema_id: &str) -> Option<&ModelHandle> {
        self.cache.get(schema_id)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Registered models, ordered by schema id.
    pub fn models(&self) -> impl Iterator<Item = &ModelHandle> {
        self.cache.values()
    }
}
