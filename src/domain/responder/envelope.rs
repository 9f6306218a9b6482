//! Reply envelope returned for every chat turn.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

use super::TreeState;

/// Which strategy produced a reply.
///
/// The serialized names are part of the public chat API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseMode {
    TreeStart,
    TreeActive,
    TreeRetry,
    TreeEnd,
    TreeBrokenState,
    TreeError,
    TopicMatch,
    AiFallback,
    ErrorFallback,
}

impl ResponseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseMode::TreeStart => "tree_start",
            ResponseMode::TreeActive => "tree_active",
            ResponseMode::TreeRetry => "tree_retry",
            ResponseMode::TreeEnd => "tree_end",
            ResponseMode::TreeBrokenState => "tree_broken_state",
            ResponseMode::TreeError => "tree_error",
            ResponseMode::TopicMatch => "topic_match",
            ResponseMode::AiFallback => "ai_fallback",
            ResponseMode::ErrorFallback => "error_fallback",
        }
    }

    /// True for modes that leave the caller inside a dialogue tree.
    pub fn keeps_tree_open(&self) -> bool {
        matches!(
            self,
            ResponseMode::TreeStart | ResponseMode::TreeActive | ResponseMode::TreeRetry
        )
    }
}

impl std::fmt::Display for ResponseMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Complete result of one chat turn.
///
/// Built once per call and not modified afterwards; fields are read through
/// accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    reply: String,
    options: Option<Vec<String>>,
    tree_state: Option<TreeState>,
    mode: ResponseMode,
    timestamp: String,
}

impl ResponseEnvelope {
    /// Creates an envelope with no options and no tree state, stamped now.
    pub fn new(reply: impl Into<String>, mode: ResponseMode) -> Self {
        Self {
            reply: reply.into(),
            options: None,
            tree_state: None,
            mode,
            timestamp: Timestamp::now().to_reply_time(),
        }
    }

    pub fn with_options(mut self, options: Option<Vec<String>>) -> Self {
        self.options = options;
        self
    }

    pub fn with_tree_state(mut self, state: TreeState) -> Self {
        self.tree_state = Some(state);
        self
    }

    /// Overrides the stamp, for callers with their own clock.
    pub fn stamped_at(mut self, at: Timestamp) -> Self {
        self.timestamp = at.to_reply_time();
        self
    }

    pub fn reply(&self) -> &str {
        &self.reply
    }

    pub fn options(&self) -> Option<&[String]> {
        self.options.as_deref()
    }

    pub fn tree_state(&self) -> Option<&TreeState> {
        self.tree_state.as_ref()
    }

    pub fn mode(&self) -> ResponseMode {
        self.mode
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_serializes_snake_case() {
        let json = serde_json::to_string(&ResponseMode::TreeBrokenState).unwrap();
        assert_eq!(json, "\"tree_broken_state\"");

        let json = serde_json::to_string(&ResponseMode::AiFallback).unwrap();
        assert_eq!(json, "\"ai_fallback\"");
    }

    #[test]
    fn mode_as_str_matches_serialization() {
        for mode in [
            ResponseMode::TreeStart,
            ResponseMode::TreeActive,
            ResponseMode::TreeRetry,
            ResponseMode::TreeEnd,
            ResponseMode::TreeBrokenState,
            ResponseMode::TreeError,
            ResponseMode::TopicMatch,
            ResponseMode::AiFallback,
            ResponseMode::ErrorFallback,
        ] {
            let json = serde_json::to_string(&mode).unwrap();
            assert_eq!(json, format!("\"{}\"", mode.as_str()));
        }
    }

    #[test]
    fn only_start_active_and_retry_keep_tree_open() {
        assert!(ResponseMode::TreeRetry.keeps_tree_open());
        assert!(!ResponseMode::TreeEnd.keeps_tree_open());
        assert!(!ResponseMode::TopicMatch.keeps_tree_open());
    }

    #[test]
    fn envelope_serializes_api_field_names() {
        let at = Timestamp::from_unix_secs(1735137000).unwrap(); // 2024-12-25T14:30:00Z
        let envelope = ResponseEnvelope::new("Choose wisely.", ResponseMode::TreeStart)
            .with_options(Some(vec!["Attack".to_string()]))
            .with_tree_state(TreeState::start("strategy"))
            .stamped_at(at);

        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "reply": "Choose wisely.",
                "options": ["Attack"],
                "treeState": { "name": "strategy", "step": "start" },
                "mode": "tree_start",
                "timestamp": "25 Dec 14:30"
            })
        );
    }

    #[test]
    fn envelope_without_tree_serializes_nulls() {
        let json = serde_json::to_value(ResponseEnvelope::new("Hi", ResponseMode::TopicMatch)).unwrap();

        assert!(json["options"].is_null());
        assert!(json["treeState"].is_null());
    }
}
