//! AI Provider Adapters.
//!
//! Implementations of the AIProvider port, plus the persona prompt responder
//! that turns any provider into a `GenerativeResponder`.
//!
//! ## Available Adapters
//!
//! - `GeminiProvider` - Google Gemini models over the Generative Language API
//! - `MockAIProvider` - Configurable mock for testing
//! - `UnavailableProvider` - Always fails; used when no API key is configured
//! - `PersonaPromptResponder` - Role-play prompt builder over an `AIProvider`

mod gemini_provider;
mod mock_provider;
mod persona_responder;
mod unavailable_provider;

pub use gemini_provider::{GeminiConfig, GeminiProvider, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
pub use mock_provider::{MockAIProvider, MockError, MockResponse};
pub use persona_responder::{build_persona_prompt, PersonaPromptResponder};
pub use unavailable_provider::UnavailableProvider;
