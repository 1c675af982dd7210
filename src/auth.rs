//! Bearer token verification
//!
//! Tokens are Supabase JWTs. Rather than validating signatures locally the
//! verifier asks Supabase Auth who the token belongs to
//! (`GET {url}/auth/v1/user`), which also catches revoked sessions.

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use crate::config::SupabaseConfig;
use crate::error::{AssistantError, Result};

/// The caller behind a verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
}

#[async_trait]
pub trait AuthVerifier: Send + Sync {
    /// Resolve a bearer token to its user; any failure is `AssistantError::Auth`
    async fn verify(&self, token: &str) -> Result<AuthUser>;
}

/// Extract the token from an `Authorization: Bearer <jwt>` header value
pub fn bearer_token(header: Option<&str>) -> Result<&str> {
    let value =
        header.ok_or_else(|| AssistantError::Auth("missing authorization header".into()))?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::trim)
        .unwrap_or("");
    if token.is_empty() {
        return Err(AssistantError::Auth("malformed authorization header".into()));
    }
    Ok(token)
}

pub struct SupabaseAuth {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl SupabaseAuth {
    pub fn new(config: &SupabaseConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: config.url.clone(),
            api_key: config.service_role_key.clone(),
        }
    }
}

#[derive(Deserialize)]
struct SupabaseUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

#[async_trait]
impl AuthVerifier for SupabaseAuth {
    async fn verify(&self, token: &str) -> Result<AuthUser> {
        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.url))
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AssistantError::Auth(format!("auth request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AssistantError::Auth(format!(
                "token rejected with {}",
                response.status()
            )));
        }
        let user: SupabaseUser = response
            .json()
            .await
            .map_err(|e| AssistantError::Auth(format!("unreadable user payload: {e}")))?;
        Ok(AuthUser {
            id: user.id,
            email: user.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(Some("Bearer abc.def")).unwrap(), "abc.def");
        assert_eq!(bearer_token(Some("bearer  xyz ")).unwrap(), "xyz");
    }

    #[test]
    fn test_bearer_token_rejects_missing_or_malformed() {
        for header in [None, Some(""), Some("Basic abc"), Some("Bearer ")] {
            let err = bearer_token(header).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::AuthExpired);
        }
    }
}
