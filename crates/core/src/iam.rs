//! IAM statements and roles.

use serde::Serialize;
use serde_json::{Value, json};

use crate::error::BuildResult;
use crate::id::LogicalId;
use crate::stack::{Resource, ResourceRef, Stack};

pub const POLICY_VERSION: &str = "2012-10-17";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// A single IAM policy statement.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyStatement {
    pub effect: Effect,
    pub actions: Vec<String>,
    pub resources: Vec<Value>,
}

impl PolicyStatement {
    pub fn allow() -> Self {
        Self {
            effect: Effect::Allow,
            actions: Vec::new(),
            resources: Vec::new(),
        }
    }

    pub fn deny() -> Self {
        Self {
            effect: Effect::Deny,
            ..Self::allow()
        }
    }

    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.actions.push(action.into());
        self
    }

    pub fn actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actions.extend(actions.into_iter().map(Into::into));
        self
    }

    /// Add a resource; plain strings or intrinsic function objects.
    pub fn resource(mut self, resource: impl Into<Value>) -> Self {
        self.resources.push(resource.into());
        self
    }

    pub fn to_json(&self) -> Value {
        // Single entries collapse to a scalar, as the provider renders them.
        fn one_or_many<T: Serialize>(items: &[T]) -> Value {
            match items {
                [single] => json!(single),
                many => json!(many),
            }
        }

        json!({
            "Effect": self.effect,
            "Action": one_or_many(&self.actions),
            "Resource": one_or_many(&self.resources),
        })
    }
}

/// Service principal allowed to assume a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicePrincipal(String);

impl ServicePrincipal {
    pub fn new(service: impl Into<String>) -> Self {
        Self(service.into())
    }

    pub fn api_gateway() -> Self {
        Self::new("apigateway.amazonaws.com")
    }

    pub fn lambda() -> Self {
        Self::new("lambda.amazonaws.com")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An IAM role plus its lazily created default policy.
#[derive(Debug, Clone)]
pub struct Role {
    handle: ResourceRef,
    policy: Option<ResourceRef>,
    statements: Vec<PolicyStatement>,
}

impl Role {
    /// Register the role in `stack` under `id`.
    pub fn create(
        stack: &mut Stack,
        id: impl Into<LogicalId>,
        assumed_by: &ServicePrincipal,
        managed_policy_arns: Vec<Value>,
    ) -> BuildResult<Self> {
        let mut properties = json!({
            "AssumeRolePolicyDocument": {
                "Version": POLICY_VERSION,
                "Statement": [{
                    "Action": "sts:AssumeRole",
                    "Effect": "Allow",
                    "Principal": { "Service": assumed_by.as_str() }
                }]
            }
        });
        if !managed_policy_arns.is_empty() {
            properties["ManagedPolicyArns"] = Value::Array(managed_policy_arns);
        }

        let handle = stack.add(id, Resource::new("AWS::IAM::Role", properties))?;
        Ok(Self {
            handle,
            policy: None,
            statements: Vec::new(),
        })
    }

    pub fn handle(&self) -> &ResourceRef {
        &self.handle
    }

    pub fn policy(&self) -> Option<&ResourceRef> {
        self.policy.as_ref()
    }

    pub fn arn(&self) -> Value {
        self.handle.attr("Arn")
    }

    pub fn statements(&self) -> &[PolicyStatement] {
        &self.statements
    }

    /// Append a statement to the role's default policy.
    pub fn add_to_policy(&mut self, stack: &mut Stack, statement: PolicyStatement) -> BuildResult<()> {
        self.statements.push(statement);
        let document = json!({
            "Version": POLICY_VERSION,
            "Statement": self.statements.iter().map(PolicyStatement::to_json).collect::<Vec<_>>(),
        });

        match &self.policy {
            Some(policy) => {
                if let Some(properties) = stack.properties_mut(policy) {
                    properties["PolicyDocument"] = document;
                }
            }
            None => {
                let id = LogicalId::from_parts(&[self.handle.id().as_str(), "DefaultPolicy"]);
                let policy = stack.add(
                    id.clone(),
                    Resource::new(
                        "AWS::IAM::Policy",
                        json!({
                            "PolicyName": id.as_str(),
                            "PolicyDocument": document,
                            "Roles": [self.handle.reference()],
                        }),
                    ),
                )?;
                self.policy = Some(policy);
            }
        }
        Ok(())
    }
}
