//! Prior conversation lines supplied by the caller.

use serde::{Deserialize, Serialize};

/// One line of earlier conversation, e.g. `{"name": "You", "text": "Hello"}`.
///
/// Only the generative responder reads history; the rule-based strategies
/// ignore it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub text: String,
}

impl HistoryEntry {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}
