//! HTTP DTOs for chat endpoints
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::foundation::{DomainError, ValidationError};
use crate::domain::responder::{HistoryEntry, TreeState};

/// Longest accepted user message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 2000;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to generate a persona reply
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub persona_name: Option<String>,
    /// Echoed back from the previous reply. Kept loose so a stale or
    /// hand-edited value reaches the engine instead of failing the request.
    #[serde(default)]
    pub tree_state: Option<serde_json::Value>,
    #[serde(default)]
    pub history: Option<Vec<HistoryEntry>>,
}

/// A chat request that passed validation.
#[derive(Debug, Clone)]
pub struct ValidChatRequest<'a> {
    pub message: &'a str,
    pub persona_name: &'a str,
    pub tree_state: Option<TreeState>,
    pub history: &'a [HistoryEntry],
}

impl ChatRequest {
    /// Checks required fields in order: persona name, message, message length.
    pub fn validate(&self) -> Result<ValidChatRequest<'_>, ValidationError> {
        let persona_name = self
            .persona_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| ValidationError::empty_field("personaName"))?;

        let message = self
            .message
            .as_deref()
            .filter(|message| !message.trim().is_empty())
            .ok_or_else(|| ValidationError::empty_field("message"))?;

        let length = message.chars().count();
        if length > MAX_MESSAGE_CHARS {
            return Err(ValidationError::too_long("message", MAX_MESSAGE_CHARS, length));
        }

        Ok(ValidChatRequest {
            message,
            persona_name,
            tree_state: self.client_tree_state(),
            history: self.history.as_deref().unwrap_or(&[]),
        })
    }

    /// Decodes the echoed tree state. An undecodable value becomes a state
    /// that resolves nowhere, so the engine answers with its recovery reply.
    fn client_tree_state(&self) -> Option<TreeState> {
        match &self.tree_state {
            None | Some(serde_json::Value::Null) => None,
            Some(value) => match serde_json::from_value::<TreeState>(value.clone()) {
                Ok(state) => Some(state),
                Err(err) => {
                    warn!(error = %err, "Undecodable tree state from client");
                    Some(TreeState::new("", ""))
                }
            },
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Response listing loaded personas
#[derive(Debug, Clone, Serialize)]
pub struct PersonaListResponse {
    pub personas: Vec<String>,
}

/// Standard error response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }
}

impl From<&DomainError> for ErrorResponse {
    fn from(err: &DomainError) -> Self {
        let details = if err.details.is_empty() {
            None
        } else {
            serde_json::to_value(&err.details).ok()
        };
        Self {
            code: err.code.to_string(),
            message: err.message.clone(),
            details,
        }
    }
}
