//! Signature verification against the issuer's published signing keys.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use tokio::sync::RwLock;

use crate::claims::{TokenClaims, validate_claims};
use crate::verifier::{AuthError, Verifier};

/// Verifies a raw bearer token against one accepted issuer.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str, verifier: &Verifier) -> Result<TokenClaims, AuthError>;
}

/// [`TokenVerifier`] backed by the issuer's JWKS endpoint.
///
/// Key sets are fetched once per issuer and kept for the lifetime of the
/// process (one warm function container).
#[derive(Debug, Default)]
pub struct JwksTokenVerifier {
    http: reqwest::Client,
    key_sets: RwLock<HashMap<String, JwkSet>>,
}

impl JwksTokenVerifier {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            key_sets: RwLock::new(HashMap::new()),
        }
    }

    async fn key_set(&self, issuer: &str) -> Result<JwkSet, AuthError> {
        if let Some(keys) = self.key_sets.read().await.get(issuer) {
            return Ok(keys.clone());
        }

        let url = format!("{issuer}/.well-known/jwks.json");
        tracing::debug!(%url, "fetching signing keys");
        let keys: JwkSet = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        self.key_sets.write().await.insert(issuer.to_string(), keys.clone());
        Ok(keys)
    }
}

#[async_trait]
impl TokenVerifier for JwksTokenVerifier {
    async fn verify(&self, token: &str, verifier: &Verifier) -> Result<TokenClaims, AuthError> {
        let issuer = verifier.issuer()?;
        let header = decode_header(token)?;
        let kid = header
            .kid
            .ok_or_else(|| AuthError::InvalidToken("token header has no key id".to_string()))?;

        let keys = self.key_set(&issuer).await?;
        let jwk = keys
            .find(&kid)
            .ok_or_else(|| AuthError::InvalidToken(format!("unknown signing key '{kid}'")))?;
        let key = DecodingKey::from_jwk(jwk)?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[issuer.as_str()]);
        // Client ids are checked per token class in `validate_claims`.
        validation.validate_aud = false;

        let claims = decode::<TokenClaims>(token, &key, &validation)?.claims;
        validate_claims(&claims, verifier, Utc::now())?;
        Ok(claims)
    }
}
