//! Response resolution domain.
//!
//! # Components
//!
//! - `WeightedSelector` - weighted random choice among canned replies
//! - `TopicMatcher` - keyword topic detection
//! - `DialogueTreeEngine` - dialogue tree trigger detection and step advancement
//! - `ResponseEnvelope` - the reply returned for every turn
//!
//! The cascade that combines these with the generative fallback lives in
//! `application::handlers::chat`.

mod dialogue_tree;
mod envelope;
mod history;
mod selector;
mod topic;
mod tree_state;

pub use dialogue_tree::{
    capitalized_option_labels, DialogueTreeEngine, BROKEN_STATE_REPLY, RETRY_PREFIX,
    TREE_ERROR_REPLY,
};
pub use envelope::{ResponseEnvelope, ResponseMode};
pub use history::HistoryEntry;
pub use selector::{
    FixedDraw, RandomSource, ScriptedDraws, ThreadRandom, Weighted, WeightedSelector,
};
pub use topic::TopicMatcher;
pub use tree_state::TreeState;
