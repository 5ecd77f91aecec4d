//! `restkit-api`: stack, endpoints and handlers of the Template API.
//!
//! The synth binary builds the stack once and writes the template; the
//! handler binaries are what the deployed functions run.

pub mod config;
pub mod endpoints;
pub mod handlers;
pub mod models;
pub mod resources;
pub mod response;
pub mod stack;

pub use config::{IdentityConfig, StackConfig, StackParameters};
pub use resources::Resources;
pub use stack::ApiStack;
