//! Generative Responder Port - free-form in-character replies.
//!
//! The response cascade calls this only after dialogue trees and keyword
//! topics have produced nothing. Any error is absorbed by the caller's
//! fallback path, so implementations should return errors rather than
//! inventing placeholder text.

use async_trait::async_trait;

use crate::domain::persona::PersonaIdentity;
use crate::domain::responder::HistoryEntry;

use super::AIError;

/// Produces a reply in the voice of a persona.
#[async_trait]
pub trait GenerativeResponder: Send + Sync {
    /// Generate a reply to `message` as `identity`, given prior `history`.
    ///
    /// # Errors
    ///
    /// Returns `AIError` for any transport or provider failure.
    async fn generate(
        &self,
        identity: &PersonaIdentity,
        message: &str,
        history: &[HistoryEntry],
    ) -> Result<String, AIError>;
}
