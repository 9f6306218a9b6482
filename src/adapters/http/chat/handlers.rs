//! HTTP handlers for chat endpoints
//!
//! These handlers connect Axum routes to the response orchestrator.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::debug;

use crate::application::handlers::chat::ResponseOrchestrator;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::PersonaProvider;

use super::dto::{ChatRequest, ErrorResponse, PersonaListResponse};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct ChatAppState {
    pub personas: Arc<dyn PersonaProvider>,
    pub orchestrator: Arc<ResponseOrchestrator>,
}

impl ChatAppState {
    pub fn new(personas: Arc<dyn PersonaProvider>, orchestrator: Arc<ResponseOrchestrator>) -> Self {
        Self {
            personas,
            orchestrator,
        }
    }
}

type ErrorReply = (StatusCode, Json<ErrorResponse>);

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::PersonaNotFound | ErrorCode::RouteNotFound => StatusCode::NOT_FOUND,
        code if code.is_client_error() => StatusCode::BAD_REQUEST,
        ErrorCode::AIProviderError => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_reply(err: &DomainError) -> ErrorReply {
    (status_for(err.code), Json(ErrorResponse::from(err)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// Generate a persona reply for one user message
///
/// POST /api/chat
pub async fn post_chat(
    State(app_state): State<ChatAppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<impl IntoResponse, impl IntoResponse> {
    let Json(req) = payload.map_err(|rejection| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request(rejection.body_text())),
        )
    })?;

    let valid = req
        .validate()
        .map_err(|err| error_reply(&DomainError::from(err)))?;

    let persona = app_state
        .personas
        .get_persona(valid.persona_name)
        .ok_or_else(|| error_reply(&DomainError::persona_not_found(valid.persona_name)))?;

    let envelope = app_state
        .orchestrator
        .generate_reply(valid.message, &persona, valid.tree_state, valid.history)
        .await;

    debug!(
        persona = %valid.persona_name,
        mode = %envelope.mode(),
        tree_open = envelope.mode().keeps_tree_open(),
        "Chat reply generated"
    );

    Ok::<_, ErrorReply>((StatusCode::OK, Json(envelope)))
}

/// List loaded persona names
///
/// GET /api/personas
pub async fn list_personas(State(app_state): State<ChatAppState>) -> impl IntoResponse {
    Json(PersonaListResponse {
        personas: app_state.personas.persona_names(),
    })
}

/// JSON 404 for unknown routes
pub async fn route_not_found() -> impl IntoResponse {
    error_reply(&DomainError::new(ErrorCode::RouteNotFound, "Route not found"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_follows_error_code() {
        assert_eq!(status_for(ErrorCode::PersonaNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorCode::EmptyField), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorCode::TooLong), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorCode::AIProviderError), StatusCode::BAD_GATEWAY);
        assert_eq!(status_for(ErrorCode::InternalError), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
