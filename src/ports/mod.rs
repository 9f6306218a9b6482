//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `AIProvider` - hosted language model completions
//! - `GenerativeResponder` - in-character free-form replies for a persona
//! - `PersonaProvider` - lookup of loaded persona configurations

mod ai_provider;
mod generative_responder;
mod persona_provider;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
    MessageRole, ProviderInfo, RequestMetadata, TokenUsage,
};
pub use generative_responder::GenerativeResponder;
pub use persona_provider::PersonaProvider;
