//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `PERSONA_CHAT` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use persona_chat::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr().expect("bad address"));
//! ```

mod ai;
mod error;
mod personas;
mod server;

pub use ai::AiConfig;
pub use error::{ConfigError, ValidationError};
pub use personas::{parse_entries, PersonaEntry, PersonasConfig};
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Unprefixed variable accepted for the Gemini key when the prefixed one is unset.
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
/// Every section has defaults, so an empty environment is a valid configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Gemini provider configuration
    #[serde(default)]
    pub ai: AiConfig,

    /// Persona files to load at startup
    #[serde(default)]
    pub personas: PersonasConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `PERSONA_CHAT` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Falls back to `GEMINI_API_KEY` when no prefixed key is set
    ///
    /// # Environment Variable Format
    ///
    /// - `PERSONA_CHAT__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `PERSONA_CHAT__AI__GEMINI_API_KEY=...` -> `ai.gemini_api_key = ...`
    /// - `PERSONA_CHAT__PERSONAS__ENTRIES=Cleopatra=cleo.json` -> `personas.entries`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let mut config: AppConfig = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PERSONA_CHAT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        if !config.ai.has_gemini() {
            config.ai.gemini_api_key = std::env::var(GEMINI_API_KEY_VAR)
                .ok()
                .filter(|key| !key.trim().is_empty());
        }

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.ai.validate()?;
        self.personas.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
