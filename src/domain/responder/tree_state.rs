//! Dialogue tree position carried across turns by the caller.

use serde::{Deserialize, Serialize};

use crate::domain::persona::START_STEP;

/// Where a user currently is inside a dialogue tree.
///
/// The server keeps no copy: the caller stores this value and sends it back
/// with the next message. It is untrusted input and is re-validated on every
/// turn.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreeState {
    /// Dialogue tree name.
    pub name: String,
    /// Current step key within the tree.
    pub step: String,
}

impl TreeState {
    pub fn new(name: impl Into<String>, step: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            step: step.into(),
        }
    }

    /// State for a tree that was just triggered.
    pub fn start(name: impl Into<String>) -> Self {
        Self::new(name, START_STEP)
    }

    /// Same tree, new step. The original state is left untouched.
    pub fn moved_to(&self, step: impl Into<String>) -> Self {
        Self::new(self.name.clone(), step)
    }
}
