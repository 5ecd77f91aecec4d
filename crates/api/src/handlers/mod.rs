//! Request-time logic for the deployed functions.
//!
//! Handlers never fail the invocation for expected problems: they answer
//! with a JSON body instead, so the gateway always has something to return.

use thiserror::Error;

pub mod authorizer;
pub mod openapi;
pub mod status;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("missing request context: {0}")]
    MissingContext(&'static str),

    #[error("export failed: {0}")]
    Export(String),

    #[error("export returned no body")]
    EmptyExport,

    #[error("unable to decode export: {0}")]
    Decode(#[from] serde_json::Error),
}
