//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (timestamps, errors)
//! - `persona` - Persona configuration data model and reference checks
//! - `responder` - Reply resolution: weighted selection, topics, dialogue trees

pub mod foundation;
pub mod persona;
pub mod responder;
