//! Chat handlers - reply resolution for a single conversation turn.

mod generate_reply;

pub use generate_reply::{ResponseOrchestrator, DEFAULT_GENERATION_TIMEOUT, LOST_FOR_WORDS_REPLY};
