//! Deployable function units.
//!
//! A [`LambdaFunction`] is a pending definition: grants accumulate on it
//! until [`LambdaFunction::materialise`] emits the function, its service
//! role and the role's default policy into the stack.

use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::{Value, json};

use crate::error::{BuildError, BuildResult};
use crate::iam::{PolicyStatement, Role, ServicePrincipal};
use crate::id::LogicalId;
use crate::stack::{Resource, ResourceRef, Stack};

pub const RUNTIME: &str = "provided.al2023";
pub const DEFAULT_HANDLER: &str = "bootstrap";
pub const DEFAULT_MEMORY_SIZE: u32 = 128;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const BASIC_EXECUTION_POLICY: &str =
    "arn:${AWS::Partition}:iam::aws:policy/service-role/AWSLambdaBasicExecutionRole";

/// Per-route overrides for a function unit. Empty means provider defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FunctionConfig {
    pub environment: BTreeMap<String, String>,
    pub handler: Option<String>,
    /// Written as whole seconds; a fraction is rounded up.
    pub timeout: Option<Duration>,
    pub memory_size: Option<u32>,
}

impl FunctionConfig {
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    pub fn with_handler(mut self, handler: impl Into<String>) -> Self {
        self.handler = Some(handler.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_memory_size(mut self, memory_size: u32) -> Self {
        self.memory_size = Some(memory_size);
        self
    }
}

/// A function unit awaiting materialisation.
#[derive(Debug, Clone)]
pub struct LambdaFunction {
    id: LogicalId,
    entry: String,
    config: FunctionConfig,
    statements: Vec<PolicyStatement>,
}

impl LambdaFunction {
    /// `entry` names the handler binary packaged as the function's asset.
    pub fn new(id: impl Into<LogicalId>, entry: impl Into<String>, config: FunctionConfig) -> Self {
        Self {
            id: id.into(),
            entry: entry.into(),
            config,
            statements: Vec::new(),
        }
    }

    pub fn id(&self) -> &LogicalId {
        &self.id
    }

    pub fn entry(&self) -> &str {
        &self.entry
    }

    pub fn config(&self) -> &FunctionConfig {
        &self.config
    }

    /// ARN of the function once materialised.
    pub fn arn(&self) -> Value {
        json!({ "Fn::GetAtt": [self.id.as_str(), "Arn"] })
    }

    pub fn add_environment(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.config.environment.insert(key.into(), value.into());
    }

    pub fn add_to_role_policy(&mut self, statement: PolicyStatement) {
        self.statements.push(statement);
    }

    pub fn statements(&self) -> &[PolicyStatement] {
        &self.statements
    }

    fn role_id(&self) -> LogicalId {
        LogicalId::from_parts(&[self.id.as_str(), "ServiceRole"])
    }

    /// Fail unless every id this unit would take is free in `stack`.
    pub fn check_available(&self, stack: &Stack) -> BuildResult<()> {
        if self.id.is_empty() {
            return Err(BuildError::configuration("function logical id must not be empty"));
        }
        let role_id = self.role_id();
        let policy_id = LogicalId::from_parts(&[role_id.as_str(), "DefaultPolicy"]);
        for id in [&self.id, &role_id, &policy_id] {
            if stack.contains(id) {
                return Err(BuildError::DuplicateResource(id.to_string()));
            }
        }
        Ok(())
    }

    /// Emit the function, its service role and the role's grants.
    ///
    /// Ids are checked first, so a failure leaves the stack untouched.
    pub fn materialise(self, stack: &mut Stack) -> BuildResult<DeployedFunction> {
        self.check_available(stack)?;
        let mut role = Role::create(
            stack,
            self.role_id(),
            &ServicePrincipal::lambda(),
            vec![json!({ "Fn::Sub": BASIC_EXECUTION_POLICY })],
        )?;
        for statement in self.statements {
            role.add_to_policy(stack, statement)?;
        }

        let mut properties = json!({
            "Code": {
                "S3Bucket": { "Fn::Sub": "restkit-assets-${AWS::AccountId}-${AWS::Region}" },
                "S3Key": format!("lambda/{}/bootstrap.zip", self.entry),
            },
            "Handler": self.config.handler.as_deref().unwrap_or(DEFAULT_HANDLER),
            "Runtime": RUNTIME,
            "Architectures": ["arm64"],
            "MemorySize": self.config.memory_size.unwrap_or(DEFAULT_MEMORY_SIZE),
            "Timeout": timeout_seconds(self.config.timeout.unwrap_or(DEFAULT_TIMEOUT)),
            "Role": role.arn(),
        });
        if !self.config.environment.is_empty() {
            properties["Environment"] = json!({ "Variables": self.config.environment });
        }

        let mut resource = Resource::new("AWS::Lambda::Function", properties).depends_on(role.handle());
        if let Some(policy) = role.policy() {
            resource = resource.depends_on(policy);
        }
        let handle = stack.add(self.id, resource)?;

        Ok(DeployedFunction { handle, role })
    }
}

fn timeout_seconds(timeout: Duration) -> u64 {
    let secs = timeout.as_secs();
    if timeout.subsec_nanos() > 0 { secs + 1 } else { secs }
}

/// A function registered in the stack.
#[derive(Debug, Clone)]
pub struct DeployedFunction {
    handle: ResourceRef,
    role: Role,
}

impl DeployedFunction {
    pub fn handle(&self) -> &ResourceRef {
        &self.handle
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn arn(&self) -> Value {
        self.handle.attr("Arn")
    }
}
