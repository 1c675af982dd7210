//! Chat endpoint routes

use std::any::Any;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};

use super::CORS_ALLOW_HEADERS;
use crate::error::AssistantError;
use crate::orchestrator::AssistantOrchestrator;

pub const CHAT_PATH: &str = "/functions/v1/neuraltwin-assistant";
pub const CHAT_ALIAS_PATH: &str = "/api/assistant/chat";

// ============================================================================
// State
// ============================================================================

#[derive(Clone)]
pub struct ChatState {
    pub orchestrator: Arc<AssistantOrchestrator>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub fn create_assistant_router(orchestrator: Arc<AssistantOrchestrator>) -> Router {
    let state = ChatState { orchestrator };

    Router::new()
        .route(CHAT_PATH, post(chat).options(preflight))
        .route(CHAT_ALIAS_PATH, post(chat).options(preflight))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_ALLOW_ORIGIN,
                    HeaderValue::from_static("*"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_ALLOW_HEADERS,
                    HeaderValue::from_static(CORS_ALLOW_HEADERS),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_ALLOW_METHODS,
                    HeaderValue::from_static("POST, OPTIONS"),
                ))
                .layer(TraceLayer::new_for_http())
                .layer(CatchPanicLayer::custom(panic_response)),
        )
}

// ============================================================================
// Handlers
// ============================================================================

/// POST - one chat turn
async fn chat(State(state): State<ChatState>, headers: HeaderMap, body: Bytes) -> Response {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match state.orchestrator.handle_chat(authorization, &body).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => e.into_response(),
    }
}

/// OPTIONS - CORS preflight; the headers come from the layers
async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// GET /health
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    AssistantError::Internal("handler panicked".into()).into_response()
}
