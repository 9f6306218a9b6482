//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid socket address: {0}")]
    InvalidSocketAddr(String),

    #[error("Invalid AI timeout")]
    InvalidAiTimeout,

    #[error("AI model name cannot be empty")]
    EmptyModel,

    #[error("Invalid AI base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("AI max_retries exceeds maximum allowed (10)")]
    TooManyRetries,

    #[error("No persona files configured")]
    NoPersonas,

    #[error("Invalid persona entry: {0}")]
    InvalidPersonaEntry(String),
}
