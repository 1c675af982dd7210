//! HTTP surface
//!
//! Endpoints:
//! - POST    /functions/v1/neuraltwin-assistant - Chat turn
//! - POST    /api/assistant/chat                - Chat turn (alias)
//! - OPTIONS on both chat paths                 - CORS preflight
//! - GET     /health                            - Health check
//!
//! Every response, errors and preflight included, carries the CORS headers.

pub mod chat_routes;

pub use chat_routes::create_assistant_router;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::error::{AssistantError, ErrorKind};

/// `Access-Control-Allow-Headers` sent on every response
pub const CORS_ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

impl IntoResponse for AssistantError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        match kind {
            ErrorKind::InternalError | ErrorKind::SessionError => {
                tracing::error!(code = kind.code(), error = %self, "Request failed");
            }
            _ => tracing::debug!(code = kind.code(), error = %self, "Request rejected"),
        }

        let status =
            StatusCode::from_u16(kind.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = self.to_response();
        let retry_after = body.retry_after_secs;
        let mut response = (status, Json(body)).into_response();
        if let Some(secs) = retry_after {
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}
