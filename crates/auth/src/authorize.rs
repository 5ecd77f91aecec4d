use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use restkit_core::Effect;

use crate::jwks::TokenVerifier;
use crate::verifier::{AuthError, Verifier};

const ANONYMOUS_PRINCIPAL: &str = "anonymous";

/// Request-authorizer event, as the gateway delivers it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerRequest {
    #[serde(default)]
    pub method_arn: String,

    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl AuthorizerRequest {
    /// Bearer token from the `Authorization` header (any case, prefix optional).
    pub fn bearer_token(&self) -> Option<&str> {
        let value = self
            .headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("authorization"))
            .map(|(_, value)| value.trim())?;

        let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
        (!token.is_empty()).then_some(token)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyDocumentStatement {
    #[serde(rename = "Action")]
    pub action: String,

    #[serde(rename = "Effect")]
    pub effect: Effect,

    #[serde(rename = "Resource")]
    pub resource: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyDocument {
    #[serde(rename = "Version")]
    pub version: String,

    #[serde(rename = "Statement")]
    pub statement: Vec<PolicyDocumentStatement>,
}

/// Authorizer answer: who the caller is and what they may invoke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerResponse {
    pub principal_id: String,
    pub policy_document: PolicyDocument,
    pub context: BTreeMap<String, String>,
}

impl AuthorizerResponse {
    fn new(principal_id: impl Into<String>, effect: Effect, method_arn: &str) -> Self {
        Self {
            principal_id: principal_id.into(),
            policy_document: PolicyDocument {
                version: restkit_core::iam::POLICY_VERSION.to_string(),
                statement: vec![PolicyDocumentStatement {
                    action: "execute-api:Invoke".to_string(),
                    effect,
                    resource: method_arn.to_string(),
                }],
            },
            context: BTreeMap::new(),
        }
    }

    pub fn deny(method_arn: &str) -> Self {
        Self::new(ANONYMOUS_PRINCIPAL, Effect::Deny, method_arn)
    }

    pub fn effect(&self) -> Effect {
        self.policy_document
            .statement
            .first()
            .map(|s| s.effect)
            .unwrap_or(Effect::Deny)
    }
}

/// Decide a request against the configured verifiers.
///
/// Verifiers are tried in order; the first one that accepts the token wins.
/// No token, no verifiers, or no accepting verifier all produce a `Deny`.
pub async fn authorize_request(
    request: &AuthorizerRequest,
    verifiers: &[Verifier],
    tokens: &dyn TokenVerifier,
) -> AuthorizerResponse {
    let Some(token) = request.bearer_token() else {
        tracing::warn!(error = %AuthError::MissingToken, method_arn = %request.method_arn, "request denied");
        return AuthorizerResponse::deny(&request.method_arn);
    };

    for verifier in verifiers {
        match tokens.verify(token, verifier).await {
            Ok(claims) => {
                tracing::info!(verifier = %verifier.name, sub = %claims.sub, "request allowed");
                let mut response = AuthorizerResponse::new(claims.sub.clone(), Effect::Allow, &request.method_arn);
                response.context.insert("verifier".to_string(), verifier.name.clone());
                response.context.insert("sub".to_string(), claims.sub);
                response
                    .context
                    .insert("tokenUse".to_string(), claims.token_use.as_str().to_string());
                return response;
            }
            Err(e) => {
                tracing::debug!(verifier = %verifier.name, error = %e, "token rejected by verifier");
            }
        }
    }

    tracing::warn!(
        method_arn = %request.method_arn,
        verifiers = verifiers.len(),
        "request denied: no verifier accepted the token"
    );
    AuthorizerResponse::deny(&request.method_arn)
}
