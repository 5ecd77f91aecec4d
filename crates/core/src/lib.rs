//! `restkit-core`: the deployment-definition resource graph.
//!
//! A [`Stack`] collects typed resources during a single, sequential
//! definition pass and synthesises them into a CloudFormation-shaped
//! [`Template`]. Nothing here talks to the provider; lookups that would
//! (hosted zones) are answered from a context map supplied up front.

pub mod error;
pub mod iam;
pub mod id;
pub mod lambda;
pub mod stack;
pub mod template;

pub use error::{BuildError, BuildResult};
pub use iam::{Effect, PolicyStatement, Role, ServicePrincipal};
pub use id::LogicalId;
pub use lambda::{DeployedFunction, FunctionConfig, LambdaFunction};
pub use stack::{RemovalPolicy, Resource, ResourceRef, Stack, StackEnv};
pub use template::Template;
