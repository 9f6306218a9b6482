//! Persona configuration: topics, weighted responses, dialogue trees and identity.

mod config;
mod ordered_map;
mod validation;

pub use config::{
    DialogueTree, PersonaConfig, PersonaIdentity, ResponseCandidate, StepDefinition, StepOption,
    FALLBACK_TOPIC, START_STEP,
};
pub use ordered_map::OrderedMap;
pub use validation::{check_references, ReferenceIssue};
