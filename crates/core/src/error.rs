//! Definition-time error model.

use thiserror::Error;

/// Result type used across the definition pass.
pub type BuildResult<T> = Result<T, BuildError>;

/// Failure raised while defining a stack.
///
/// `Configuration` and `ExternalProvider` abort the whole build. The
/// per-endpoint variants (`UnsupportedMethod`, `InvalidPath`) are isolated
/// by batch registration and only logged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// Mutually exclusive or ambiguous setup, detected before resources exist.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The verb of a REST signature is not one of the supported methods.
    #[error("unsupported HTTP method: {method}; supported keys are: {supported}")]
    UnsupportedMethod { method: String, supported: String },

    /// A path could not be decomposed into a tree node.
    #[error("unable to make route resource; unexpectedly short path: {0}")]
    InvalidPath(String),

    /// A provider-side lookup or validation failed (zone lookup miss, ...).
    #[error("external provider error: {0}")]
    ExternalProvider(String),

    /// Two resources were registered under the same logical id.
    #[error("duplicate resource: there is already a resource named '{0}' in this stack")]
    DuplicateResource(String),
}

impl BuildError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath(path.into())
    }

    pub fn external(msg: impl Into<String>) -> Self {
        Self::ExternalProvider(msg.into())
    }

    /// Whether the failure invalidates the whole definition pass.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::ExternalProvider(_))
    }
}
