use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::verifier::{TokenUse, Verifier};

/// Claims of a pool-issued token (transport-agnostic).
///
/// This is the subset the authorizer inspects once the token's signature
/// has been checked by a [`TokenVerifier`](crate::TokenVerifier).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Issuer URL.
    pub iss: String,

    /// Subject (the user's id within the pool).
    pub sub: String,

    pub token_use: TokenUse,

    /// App client id; carried by id tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,

    /// App client id; carried by access tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Issued-at, seconds since the epoch.
    pub iat: i64,

    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

impl TokenClaims {
    /// The client id for this token class.
    pub fn client(&self) -> Option<&str> {
        match self.token_use {
            TokenUse::Id => self.aud.as_deref(),
            TokenUse::Access => self.client_id.as_deref(),
        }
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.iat, 0).single()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,

    #[error("issuer mismatch: expected '{expected}', got '{actual}'")]
    IssuerMismatch { expected: String, actual: String },

    #[error("token use mismatch: expected '{}'", .0.as_str())]
    TokenUseMismatch(TokenUse),

    #[error("token was not issued to client '{0}'")]
    ClientMismatch(String),
}

/// Deterministically validate token claims against one verifier.
///
/// Signature verification happens before this and is not repeated here.
pub fn validate_claims(
    claims: &TokenClaims,
    verifier: &Verifier,
    now: DateTime<Utc>,
) -> Result<(), TokenValidationError> {
    let (Some(issued_at), Some(expires_at)) = (claims.issued_at(), claims.expires_at()) else {
        return Err(TokenValidationError::InvalidTimeWindow);
    };
    if expires_at <= issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= expires_at {
        return Err(TokenValidationError::Expired);
    }

    // An unparseable pool id can never match a real issuer.
    let expected_issuer = verifier.issuer().unwrap_or_default();
    if claims.iss != expected_issuer {
        return Err(TokenValidationError::IssuerMismatch {
            expected: expected_issuer,
            actual: claims.iss.clone(),
        });
    }
    if claims.token_use != verifier.token_use {
        return Err(TokenValidationError::TokenUseMismatch(verifier.token_use));
    }
    if claims.client() != Some(verifier.client_id.as_str()) {
        return Err(TokenValidationError::ClientMismatch(verifier.client_id.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn verifier() -> Verifier {
        Verifier {
            name: "Pool".to_string(),
            user_pool_id: "eu-west-2_abc123".to_string(),
            token_use: TokenUse::Access,
            client_id: "client-1".to_string(),
            oauth_url: "https://auth.example.com".to_string(),
        }
    }

    fn claims(now: DateTime<Utc>) -> TokenClaims {
        TokenClaims {
            iss: "https://cognito-idp.eu-west-2.amazonaws.com/eu-west-2_abc123".to_string(),
            sub: "user-1".to_string(),
            token_use: TokenUse::Access,
            aud: None,
            client_id: Some("client-1".to_string()),
            iat: (now - Duration::minutes(5)).timestamp(),
            exp: (now + Duration::minutes(55)).timestamp(),
        }
    }

    #[test]
    fn matching_claims_are_accepted() {
        let now = Utc::now();
        assert_eq!(validate_claims(&claims(now), &verifier(), now), Ok(()));
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now();
        let later = now + Duration::hours(2);
        assert_eq!(
            validate_claims(&claims(now), &verifier(), later),
            Err(TokenValidationError::Expired)
        );
    }

    #[test]
    fn future_token_is_rejected() {
        let now = Utc::now();
        let earlier = now - Duration::hours(1);
        assert_eq!(
            validate_claims(&claims(now), &verifier(), earlier),
            Err(TokenValidationError::NotYetValid)
        );
    }

    #[test]
    fn other_pool_is_rejected() {
        let now = Utc::now();
        let mut other = claims(now);
        other.iss = "https://cognito-idp.eu-west-2.amazonaws.com/eu-west-2_other".to_string();
        match validate_claims(&other, &verifier(), now) {
            Err(TokenValidationError::IssuerMismatch { .. }) => {}
            r => panic!("Expected IssuerMismatch, got {r:?}"),
        }
    }

    #[test]
    fn id_token_is_rejected_by_access_verifier() {
        let now = Utc::now();
        let mut id_token = claims(now);
        id_token.token_use = TokenUse::Id;
        assert_eq!(
            validate_claims(&id_token, &verifier(), now),
            Err(TokenValidationError::TokenUseMismatch(TokenUse::Access))
        );
    }

    #[test]
    fn id_tokens_match_client_through_aud() {
        let now = Utc::now();
        let id_verifier = Verifier {
            token_use: TokenUse::Id,
            ..verifier()
        };
        let mut id_token = claims(now);
        id_token.token_use = TokenUse::Id;
        id_token.client_id = None;
        id_token.aud = Some("client-1".to_string());
        assert_eq!(validate_claims(&id_token, &id_verifier, now), Ok(()));

        id_token.aud = Some("client-2".to_string());
        assert_eq!(
            validate_claims(&id_token, &id_verifier, now),
            Err(TokenValidationError::ClientMismatch("client-1".to_string()))
        );
    }
}
