//! Dialogue tree state machine.
//!
//! A tree session moves through
//! `NONE -> tree_start -> {tree_active | tree_retry}* -> tree_end -> NONE`.
//! `tree_broken_state` and `tree_error` drop the caller back to `NONE` when
//! the state or the tree data cannot be trusted.
//!
//! The engine never fails: caller-supplied `TreeState` values are untrusted,
//! so every lookup is checked and a bad lookup becomes a recovery envelope.

use regex::RegexBuilder;
use tracing::{error, warn};

use crate::domain::persona::{DialogueTree, OrderedMap, StepDefinition, StepOption};

use super::{ResponseEnvelope, ResponseMode, TreeState};

/// Reply when the caller's tree state names a tree or step that does not exist.
pub const BROKEN_STATE_REPLY: &str =
    "I seem to have lost my train of thought. What were we talking about?";

/// Reply when a step points at a step the tree does not define.
pub const TREE_ERROR_REPLY: &str = "...";

/// Prefix of the reply when input matched no option and there is no default.
pub const RETRY_PREFIX: &str = "I did not understand. ";

/// Detects tree entry and advances tree sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct DialogueTreeEngine;

impl DialogueTreeEngine {
    /// Finds the first tree, in configuration order, with a trigger appearing
    /// in `text` as a whole word (case-insensitive).
    ///
    /// Whole-word matching keeps "war" from opening a tree on "warfare".
    pub fn detect_trigger(&self, text: &str, trees: &OrderedMap<DialogueTree>) -> Option<TreeState> {
        trees
            .iter()
            .find(|(_, tree)| tree.triggers.iter().any(|t| contains_whole_word(text, t)))
            .map(|(name, _)| TreeState::start(name))
    }

    /// Opening envelope for a freshly triggered tree.
    pub fn start(&self, state: TreeState, trees: &OrderedMap<DialogueTree>) -> ResponseEnvelope {
        let Some(step) = resolve(&state, trees) else {
            return broken_state(&state);
        };

        ResponseEnvelope::new(step.bot_text.clone(), ResponseMode::TreeStart)
            .with_options(capitalized_option_labels(&step.options))
            .with_tree_state(state)
    }

    /// Moves a tree session forward by one user turn.
    pub fn advance(
        &self,
        user_text: &str,
        state: &TreeState,
        trees: &OrderedMap<DialogueTree>,
    ) -> ResponseEnvelope {
        let Some(tree) = trees.get(&state.name) else {
            return broken_state(state);
        };
        let Some(current) = tree.step(&state.step) else {
            return broken_state(state);
        };

        let lower_input = user_text.to_lowercase();
        let next_key = matching_option(&current.options, &lower_input)
            .map(|option| option.next_step.as_str())
            .filter(|key| !key.is_empty())
            .or(current.default_next.as_deref())
            .filter(|key| !key.is_empty());

        let Some(next_key) = next_key else {
            return ResponseEnvelope::new(
                format!("{}{}", RETRY_PREFIX, current.bot_text),
                ResponseMode::TreeRetry,
            )
            .with_options(capitalized_option_labels(&current.options))
            .with_tree_state(state.clone());
        };

        let Some(next) = tree.step(next_key) else {
            error!(
                tree = %state.name,
                step = %state.step,
                next_step = %next_key,
                "Missing next step definition"
            );
            return ResponseEnvelope::new(TREE_ERROR_REPLY, ResponseMode::TreeError);
        };

        if next.terminal {
            return ResponseEnvelope::new(next.bot_text.clone(), ResponseMode::TreeEnd);
        }

        ResponseEnvelope::new(next.bot_text.clone(), ResponseMode::TreeActive)
            .with_options(capitalized_option_labels(&next.options))
            .with_tree_state(state.moved_to(next_key))
    }
}

/// Display labels for a step's options: keys in order with the first
/// character upper-cased. `None` when the step offers no options.
pub fn capitalized_option_labels(options: &OrderedMap<StepOption>) -> Option<Vec<String>> {
    if options.is_empty() {
        return None;
    }
    Some(options.keys().map(capitalize_first).collect())
}

fn capitalize_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// First option (in order) whose key is a substring of the lower-cased input.
fn matching_option<'a>(options: &'a OrderedMap<StepOption>, lower_input: &str) -> Option<&'a StepOption> {
    options
        .iter()
        .find(|(key, _)| lower_input.contains(*key))
        .map(|(_, option)| option)
}

fn resolve<'a>(state: &TreeState, trees: &'a OrderedMap<DialogueTree>) -> Option<&'a StepDefinition> {
    trees.get(&state.name)?.step(&state.step)
}

fn broken_state(state: &TreeState) -> ResponseEnvelope {
    warn!(
        tree = %state.name,
        step = %state.step,
        "Invalid tree state received, resetting tree"
    );
    ResponseEnvelope::new(BROKEN_STATE_REPLY, ResponseMode::TreeBrokenState)
}

fn contains_whole_word(text: &str, word: &str) -> bool {
    if word.trim().is_empty() {
        return false;
    }

    let pattern = format!(r"\b{}\b", regex::escape(word));
    match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => re.is_match(text),
        Err(e) => {
            warn!(trigger = %word, error = %e, "Skipping unusable trigger");
            false
        }
    }
}
