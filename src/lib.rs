//! Persona Chat - Conversational responder for historical personas
//!
//! Replies come from a cascade of strategies: scripted dialogue trees,
//! keyword topics with weighted canned responses, and a generative
//! fallback that role-plays the persona through a language model.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
