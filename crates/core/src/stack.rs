//! The stack: a flat registry of typed resources keyed by logical id.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Value, json};

use crate::error::{BuildError, BuildResult};
use crate::id::LogicalId;
use crate::template::Template;

/// One declared resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resource {
    #[serde(rename = "Type")]
    pub kind: String,

    #[serde(rename = "Properties")]
    pub properties: Value,

    #[serde(rename = "DependsOn", skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<LogicalId>,

    #[serde(rename = "DeletionPolicy", skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<RemovalPolicy>,

    #[serde(rename = "UpdateReplacePolicy", skip_serializing_if = "Option::is_none")]
    pub update_replace_policy: Option<RemovalPolicy>,
}

/// What happens to a resource's data when it leaves the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RemovalPolicy {
    Delete,
    Retain,
    Snapshot,
}

impl Resource {
    pub fn new(kind: impl Into<String>, properties: Value) -> Self {
        Self {
            kind: kind.into(),
            properties,
            depends_on: Vec::new(),
            deletion_policy: None,
            update_replace_policy: None,
        }
    }

    /// Apply `policy` on deletion and on replacement.
    pub fn with_removal_policy(mut self, policy: RemovalPolicy) -> Self {
        self.deletion_policy = Some(policy);
        self.update_replace_policy = Some(policy);
        self
    }

    pub fn depends_on(mut self, other: &ResourceRef) -> Self {
        self.depends_on.push(other.id().clone());
        self
    }
}

/// Handle to a resource registered in a [`Stack`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceRef {
    id: LogicalId,
    kind: String,
}

impl ResourceRef {
    pub fn id(&self) -> &LogicalId {
        &self.id
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// `{"Ref": id}`
    pub fn reference(&self) -> Value {
        json!({ "Ref": self.id.as_str() })
    }

    /// `{"Fn::GetAtt": [id, attribute]}`
    pub fn attr(&self, attribute: &str) -> Value {
        json!({ "Fn::GetAtt": [self.id.as_str(), attribute] })
    }

    /// `${id.attribute}` placeholder for use inside `Fn::Sub` strings.
    pub fn sub_attr(&self, attribute: &str) -> String {
        format!("${{{}.{}}}", self.id, attribute)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Output {
    #[serde(rename = "Value")]
    value: Value,

    #[serde(rename = "Description")]
    description: String,
}

/// Deployment target of a stack.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StackEnv {
    pub account: Option<String>,
    pub region: Option<String>,
}

/// Deployment definition for one stack.
///
/// Built once, sequentially; every resource is added through [`Stack::add`]
/// which refuses duplicate logical ids the same way the provider does.
#[derive(Debug, Clone)]
pub struct Stack {
    name: String,
    description: Option<String>,
    env: StackEnv,
    resources: BTreeMap<LogicalId, Resource>,
    outputs: BTreeMap<String, Output>,
    context: BTreeMap<String, String>,
}

impl Stack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            env: StackEnv::default(),
            resources: BTreeMap::new(),
            outputs: BTreeMap::new(),
            context: BTreeMap::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_env(mut self, env: StackEnv) -> Self {
        self.env = env;
        self
    }

    /// Seed a context value (answers for definition-time lookups).
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn env(&self) -> &StackEnv {
        &self.env
    }

    /// Register a resource. Fails if the logical id is already taken.
    pub fn add(&mut self, id: impl Into<LogicalId>, resource: Resource) -> BuildResult<ResourceRef> {
        let id = id.into();
        if id.is_empty() {
            return Err(BuildError::configuration("resource logical id must not be empty"));
        }
        if self.resources.contains_key(&id) {
            return Err(BuildError::DuplicateResource(id.to_string()));
        }

        tracing::debug!(logical_id = %id, kind = %resource.kind, "resource added");
        let handle = ResourceRef {
            id: id.clone(),
            kind: resource.kind.clone(),
        };
        self.resources.insert(id, resource);
        Ok(handle)
    }

    /// First free id derived from `base` (`Base`, `Base2`, `Base3`, ...).
    pub fn unique_id(&self, base: &LogicalId) -> LogicalId {
        if !self.resources.contains_key(base) {
            return base.clone();
        }
        (2..)
            .map(|n| base.with_suffix(n))
            .find(|candidate| !self.resources.contains_key(candidate))
            .unwrap_or_else(|| base.clone())
    }

    pub fn contains(&self, id: &LogicalId) -> bool {
        self.resources.contains_key(id)
    }

    pub fn resource(&self, handle: &ResourceRef) -> Option<&Resource> {
        self.resources.get(handle.id())
    }

    /// Mutable access to a registered resource's properties.
    pub fn properties_mut(&mut self, handle: &ResourceRef) -> Option<&mut Value> {
        self.resources.get_mut(handle.id()).map(|r| &mut r.properties)
    }

    /// Make `resource` wait for `dependency` (no-op if already recorded).
    pub fn add_dependency(&mut self, resource: &ResourceRef, dependency: &ResourceRef) {
        if let Some(r) = self.resources.get_mut(resource.id()) {
            if !r.depends_on.contains(dependency.id()) {
                r.depends_on.push(dependency.id().clone());
            }
        }
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    pub fn add_output(&mut self, name: impl Into<String>, value: Value, description: impl Into<String>) {
        self.outputs.insert(
            name.into(),
            Output {
                value,
                description: description.into(),
            },
        );
    }

    /// Answer a definition-time lookup from the stack context.
    pub fn lookup_context(&self, key: &str) -> BuildResult<&str> {
        self.context
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| BuildError::external(format!("context lookup failed for '{key}'")))
    }

    /// Render the CloudFormation-shaped template.
    pub fn synth(&self) -> Template {
        let mut doc = serde_json::Map::new();
        if let Some(description) = &self.description {
            doc.insert("Description".to_string(), Value::String(description.clone()));
        }
        doc.insert("Resources".to_string(), json!(self.resources));
        if !self.outputs.is_empty() {
            doc.insert("Outputs".to_string(), json!(self.outputs));
        }
        Template::new(Value::Object(doc))
    }
}
