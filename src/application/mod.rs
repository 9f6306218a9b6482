//! Application layer - Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::{ResponseOrchestrator, DEFAULT_GENERATION_TIMEOUT, LOST_FOR_WORDS_REPLY};
