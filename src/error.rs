//! Error handling for the assistant pipeline
//!
//! `AssistantError` is the single library error. Everything user-visible goes
//! through `ErrorKind`, the closed taxonomy table: each kind has one code, one
//! HTTP status and one canned Korean message. Handlers never build their own
//! error strings for the client.

use assistant_types::ErrorResponse;
use thiserror::Error;

/// Closed taxonomy of failures surfaced to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    AuthExpired,
    RateLimited,
    SessionError,
    InternalError,
    InvalidRequest,
    Forbidden,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 6] = [
        ErrorKind::AuthExpired,
        ErrorKind::RateLimited,
        ErrorKind::SessionError,
        ErrorKind::InternalError,
        ErrorKind::InvalidRequest,
        ErrorKind::Forbidden,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::AuthExpired => "AUTH_EXPIRED",
            Self::RateLimited => "RATE_LIMITED",
            Self::SessionError => "SESSION_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::Forbidden => "FORBIDDEN",
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            Self::AuthExpired => 401,
            Self::RateLimited => 429,
            Self::SessionError => 500,
            Self::InternalError => 500,
            Self::InvalidRequest => 400,
            Self::Forbidden => 403,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::AuthExpired => "로그인이 만료되었습니다. 다시 로그인해주세요.",
            Self::RateLimited => "요청이 너무 많습니다. 잠시 후 다시 시도해주세요.",
            Self::SessionError => "대화 세션을 불러오지 못했습니다. 새로고침 후 다시 시도해주세요.",
            Self::InternalError => "일시적인 오류가 발생했습니다. 잠시 후 다시 시도해주세요.",
            Self::InvalidRequest => "메시지를 입력해주세요.",
            Self::Forbidden => "해당 매장에 접근할 권한이 없습니다.",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Main error type for the assistant library
#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Data source error: {0}")]
    Data(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Upstream request failed: {0}")]
    Upstream(String),

    #[cfg(feature = "database")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AssistantError {
    /// Taxonomy kind this error is reported as
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Auth(_) => ErrorKind::AuthExpired,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Session(_) => ErrorKind::SessionError,
            _ => ErrorKind::InternalError,
        }
    }

    pub fn status(&self) -> u16 {
        self.kind().status()
    }

    /// Client-facing body. Never includes the internal detail.
    pub fn to_response(&self) -> ErrorResponse {
        let kind = self.kind();
        ErrorResponse {
            error: kind.code().to_string(),
            message: kind.user_message().to_string(),
            retry_after_secs: match self {
                Self::RateLimited { retry_after_secs } => Some(*retry_after_secs),
                _ => None,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, AssistantError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_taxonomy_codes_unique() {
        let codes: HashSet<_> = ErrorKind::ALL.iter().map(|k| k.code()).collect();
        assert_eq!(codes.len(), ErrorKind::ALL.len());
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(AssistantError::Auth("missing".into()).status(), 401);
        assert_eq!(
            AssistantError::RateLimited {
                retry_after_secs: 3
            }
            .status(),
            429
        );
        assert_eq!(AssistantError::Forbidden("store".into()).status(), 403);
        assert_eq!(AssistantError::InvalidRequest("empty".into()).status(), 400);
        assert_eq!(AssistantError::Data("rpc".into()).status(), 500);
    }

    #[test]
    fn test_response_hides_detail() {
        let err = AssistantError::Data("relation \"kpi\" does not exist".into());
        let body = err.to_response();
        assert_eq!(body.error, "INTERNAL_ERROR");
        assert!(!body.message.contains("relation"));
    }

    #[test]
    fn test_rate_limited_carries_retry_after() {
        let body = AssistantError::RateLimited {
            retry_after_secs: 12,
        }
        .to_response();
        assert_eq!(body.retry_after_secs, Some(12));
    }
}
