//! Adapters - Implementations of ports for external systems.
//!
//! - `ai` - Gemini and mock `AIProvider`s, persona prompt responder
//! - `persona` - JSON file persona catalog
//! - `http` - Axum REST endpoints

pub mod ai;
pub mod http;
pub mod persona;
