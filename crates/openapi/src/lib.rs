//! `restkit-openapi`: route registration and OpenAPI model composition.
//!
//! The [`RestApi`] composite walks a list of [`RouteMetadata`] descriptors
//! once, at definition time:
//!
//! - parses each `"{METHOD} {path}"` signature,
//! - materialises the route's function and lets the route attach grants,
//! - ensures the path's node in the [`RouteTree`] (parents first, memoised),
//! - binds the method with its parameters and models, each model resolved
//!   through the [`ModelFactory`] so a schema id maps to one resource,
//! - authorises the shared execution role to invoke the function.
//!
//! Nothing here runs at request time.

pub mod basic_models;
pub mod document;
pub mod domain;
pub mod endpoint;
pub mod model_factory;
pub mod report;
pub mod rest_api;
pub mod route_tree;
pub mod routes;

pub use endpoint::{Endpoint, MethodOptions, OpenApiFunction};
pub use model_factory::{MODEL_SUFFIX, ModelFactory, ModelHandle};
pub use rest_api::{RegistrationFailure, RestApi, RestApiOptions, RestApiProps};
pub use route_tree::{RouteNode, RouteTree};
pub use routes::{GrantFn, HttpMethod, MethodResponse, ModelSpec, RouteMetadata, parse_signature};
