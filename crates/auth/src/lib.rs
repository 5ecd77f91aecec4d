//! `restkit-auth`: the request authorizer behind every private route.
//!
//! This crate knows nothing about stacks or gateways beyond the authorizer
//! event shape: it decides whether a bearer token was issued by one of the
//! configured [`Verifier`]s and answers with an IAM policy document.

pub mod authorize;
pub mod claims;
pub mod jwks;
pub mod verifier;

pub use authorize::{AuthorizerRequest, AuthorizerResponse, authorize_request};
pub use claims::{TokenClaims, TokenValidationError, validate_claims};
pub use jwks::{JwksTokenVerifier, TokenVerifier};
pub use verifier::{AUTH_VERIFIERS_ENV, AuthError, TokenUse, Verifier, verifiers_from_env, verifiers_to_env};
