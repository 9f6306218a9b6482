//! HTTP adapter for chat endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{ChatRequest, ErrorResponse, PersonaListResponse, ValidChatRequest, MAX_MESSAGE_CHARS};
pub use handlers::{list_personas, post_chat, route_not_found, ChatAppState};
pub use routes::routes;
