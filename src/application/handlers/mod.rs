//! Application handlers.
//!
//! Handlers that orchestrate domain operations over ports.

pub mod chat;

pub use chat::{ResponseOrchestrator, DEFAULT_GENERATION_TIMEOUT, LOST_FOR_WORDS_REPLY};
