//! Request authorizer bound to the verifiers in its environment.

use restkit_auth::{
    AUTH_VERIFIERS_ENV, AuthError, AuthorizerRequest, AuthorizerResponse, TokenVerifier, Verifier,
    authorize_request, verifiers_from_env,
};

pub struct AuthorizerHandler<T> {
    verifiers: Vec<Verifier>,
    tokens: T,
}

impl<T: TokenVerifier> AuthorizerHandler<T> {
    pub fn new(verifiers: Vec<Verifier>, tokens: T) -> Self {
        Self { verifiers, tokens }
    }

    /// Read the verifier list from `AUTH_VERIFIERS_JSON`; unset means none.
    pub fn from_env(tokens: T) -> Result<Self, AuthError> {
        let raw = std::env::var(AUTH_VERIFIERS_ENV).unwrap_or_default();
        Ok(Self::new(verifiers_from_env(&raw)?, tokens))
    }

    pub fn verifiers(&self) -> &[Verifier] {
        &self.verifiers
    }

    pub async fn handle(&self, request: &AuthorizerRequest) -> AuthorizerResponse {
        authorize_request(request, &self.verifiers, &self.tokens).await
    }
}
