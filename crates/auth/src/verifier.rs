//! Accepted token issuers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::claims::TokenValidationError;

/// Environment variable carrying the serialised verifier list into the
/// authorizer function.
pub const AUTH_VERIFIERS_ENV: &str = "AUTH_VERIFIERS_JSON";

/// Which class of token a verifier accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenUse {
    Id,
    Access,
}

impl TokenUse {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Access => "access",
        }
    }
}

/// One accepted identity-token issuer (a user pool plus app client).
///
/// Immutable once supplied; a list of these configures the default
/// authorizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verifier {
    pub name: String,
    /// e.g. `"us-east-1_123456789"`
    pub user_pool_id: String,
    pub token_use: TokenUse,
    pub client_id: String,
    /// e.g. `"https://connected-web.auth.us-east-1.amazoncognito.com"`
    pub oauth_url: String,
}

impl Verifier {
    /// Region encoded in the pool id prefix.
    pub fn region(&self) -> Option<&str> {
        self.user_pool_id
            .split_once('_')
            .map(|(region, _)| region)
            .filter(|region| !region.is_empty())
    }

    /// Issuer (`iss` claim) of tokens minted by this pool.
    pub fn issuer(&self) -> Result<String, AuthError> {
        let region = self.region().ok_or_else(|| {
            AuthError::InvalidVerifier(format!(
                "{}: user pool id '{}' has no region prefix",
                self.name, self.user_pool_id
            ))
        })?;
        Ok(format!("https://cognito-idp.{region}.amazonaws.com/{}", self.user_pool_id))
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid verifier configuration: {0}")]
    InvalidVerifier(String),

    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("unable to fetch signing keys: {0}")]
    Jwks(String),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        Self::InvalidToken(e.to_string())
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        Self::Jwks(e.to_string())
    }
}

/// Serialise verifiers for the authorizer's environment.
pub fn verifiers_to_env(verifiers: &[Verifier]) -> serde_json::Result<String> {
    serde_json::to_string(verifiers)
}

/// Parse the authorizer's environment value. Blank means no verifiers.
pub fn verifiers_from_env(raw: &str) -> Result<Vec<Verifier>, AuthError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw).map_err(|e| AuthError::InvalidVerifier(format!("{AUTH_VERIFIERS_ENV}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Verifier {
        Verifier {
            name: "ConnectedWebCognito".to_string(),
            user_pool_id: "eu-west-2_abc123".to_string(),
            token_use: TokenUse::Access,
            client_id: "abcd1234ghij5678klmn9012".to_string(),
            oauth_url: "https://connected-web.auth.eu-west-2.amazoncognito.com".to_string(),
        }
    }

    #[test]
    fn verifiers_serialise_with_camel_case_keys() {
        let raw = verifiers_to_env(&[sample()]).unwrap();
        assert!(raw.contains("\"userPoolId\":\"eu-west-2_abc123\""));
        assert!(raw.contains("\"tokenUse\":\"access\""));
        assert_eq!(verifiers_from_env(&raw).unwrap(), vec![sample()]);
    }

    #[test]
    fn blank_env_means_no_verifiers() {
        assert!(verifiers_from_env("").unwrap().is_empty());
        assert!(verifiers_from_env("[]").unwrap().is_empty());
    }

    #[test]
    fn malformed_env_is_rejected() {
        let err = verifiers_from_env("{not json").unwrap_err();
        match err {
            AuthError::InvalidVerifier(msg) => assert!(msg.starts_with(AUTH_VERIFIERS_ENV)),
            _ => panic!("Expected InvalidVerifier error"),
        }
    }

    #[test]
    fn issuer_is_derived_from_pool_region() {
        assert_eq!(
            sample().issuer().unwrap(),
            "https://cognito-idp.eu-west-2.amazonaws.com/eu-west-2_abc123"
        );

        let broken = Verifier {
            user_pool_id: "nopool".to_string(),
            ..sample()
        };
        assert!(broken.issuer().is_err());
    }
}
