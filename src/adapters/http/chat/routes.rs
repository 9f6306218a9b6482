//! Route definitions for chat endpoints

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{list_personas, post_chat, route_not_found, ChatAppState};

/// Create chat router with all endpoints
///
/// # Endpoints
///
/// - `POST /api/chat` - Generate a persona reply
/// - `GET /api/personas` - List loaded personas
pub fn routes() -> Router<ChatAppState> {
    Router::new()
        .route("/api/chat", post(post_chat))
        .route("/api/personas", get(list_personas))
        .fallback(route_not_found)
}
