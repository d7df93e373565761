//! Identity and admin-key verification.
//!
//! Token verification is delegated entirely to the external identity
//! provider: this module never decodes or trusts token contents locally.
//! The provider client gets its own HTTP timeout, independent of the
//! database pool's acquire timeout.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::config::IdentityConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Unauthorized - Missing token")]
    MissingToken,
    #[error("Unauthorized - Invalid token")]
    InvalidToken,
}

/// Verifies opaque bearer tokens against an identity provider.
///
/// `verify` returns the provider's stable subject id for the token holder.
/// `delete_account` removes the provider-side account for the same token;
/// it is only called from the account-deletion flow.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<String, AuthError>;
    async fn delete_account(&self, token: &str) -> Result<(), AuthError>;
}

/// Production verifier backed by the Firebase Identity Toolkit REST API.
pub struct FirebaseTokenVerifier {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Deserialize)]
struct LookupUser {
    #[serde(rename = "localId")]
    local_id: String,
}

impl FirebaseTokenVerifier {
    pub fn new(config: &IdentityConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, method: &str) -> String {
        format!("{}/accounts:{}?key={}", self.endpoint, method, self.api_key)
    }
}

#[async_trait]
impl TokenVerifier for FirebaseTokenVerifier {
    async fn verify(&self, token: &str) -> Result<String, AuthError> {
        let response = self
            .http
            .post(self.url("lookup"))
            .json(&serde_json::json!({ "idToken": token }))
            .send()
            .await
            .map_err(|e| {
                warn!("identity provider unreachable: {e}");
                AuthError::InvalidToken
            })?;

        if !response.status().is_success() {
            warn!("token rejected by identity provider: {}", response.status());
            return Err(AuthError::InvalidToken);
        }

        let lookup: LookupResponse = response.json().await.map_err(|e| {
            warn!("malformed identity provider response: {e}");
            AuthError::InvalidToken
        })?;

        lookup
            .users
            .into_iter()
            .next()
            .map(|u| u.local_id)
            .ok_or(AuthError::InvalidToken)
    }

    async fn delete_account(&self, token: &str) -> Result<(), AuthError> {
        let response = self
            .http
            .post(self.url("delete"))
            .json(&serde_json::json!({ "idToken": token }))
            .send()
            .await
            .map_err(|e| {
                warn!("identity provider unreachable: {e}");
                AuthError::InvalidToken
            })?;

        if !response.status().is_success() {
            warn!(
                "account deletion rejected by identity provider: {}",
                response.status()
            );
            return Err(AuthError::InvalidToken);
        }

        Ok(())
    }
}

/// Credential check for catalog-mutating routes.
///
/// The current scheme is a single shared secret; the trait exists so a
/// per-admin token scheme can replace it without touching handler code.
pub trait AdminCredential: Send + Sync {
    fn authorize(&self, supplied: &str) -> bool;
}

/// Shared-secret credential loaded from config at startup.
pub struct StaticKey {
    secret: Option<String>,
}

impl StaticKey {
    pub fn new(secret: Option<String>) -> Self {
        Self { secret }
    }
}

impl AdminCredential for StaticKey {
    fn authorize(&self, supplied: &str) -> bool {
        match &self.secret {
            Some(secret) => !secret.is_empty() && supplied == secret,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_key_accepts_exact_match() {
        let gate = StaticKey::new(Some("s3cret".to_string()));
        assert!(gate.authorize("s3cret"));
    }

    #[test]
    fn static_key_rejects_mismatch() {
        let gate = StaticKey::new(Some("s3cret".to_string()));
        assert!(!gate.authorize("guess"));
        assert!(!gate.authorize(""));
    }

    #[test]
    fn unconfigured_gate_rejects_everything() {
        let gate = StaticKey::new(None);
        assert!(!gate.authorize("anything"));

        let empty = StaticKey::new(Some(String::new()));
        assert!(!empty.authorize(""));
    }

    #[test]
    fn verifier_urls_carry_method_and_key() {
        let verifier = FirebaseTokenVerifier::new(&IdentityConfig {
            api_key: "k123".to_string(),
            endpoint: "https://id.example.com/v1/".to_string(),
            timeout_secs: 5,
        })
        .unwrap();

        assert_eq!(
            verifier.url("lookup"),
            "https://id.example.com/v1/accounts:lookup?key=k123"
        );
        assert_eq!(
            verifier.url("delete"),
            "https://id.example.com/v1/accounts:delete?key=k123"
        );
    }
}
