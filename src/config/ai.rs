//! AI provider configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

const MIN_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(1);

/// Gemini provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Gemini API key. Without one every generative turn falls back to
    /// the persona's canned fallback replies.
    pub gemini_api_key: Option<String>,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// API root, overridable for proxies and tests
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bound on one generative reply, retries included
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries on retryable failures
    #[serde(default = "default_retries")]
    pub max_retries: u32,

    /// First retry backoff in milliseconds; doubles on every retry
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    /// Total sleep between attempts when every retry is used.
    pub fn total_backoff(&self) -> Duration {
        let doublings = (1u32 << self.max_retries.min(16)) - 1;
        self.retry_base_delay()
            .checked_mul(doublings)
            .unwrap_or(Duration::MAX)
    }

    /// Timeout for a single provider request.
    ///
    /// The whole reply is bounded by `timeout()`, so each attempt gets an
    /// equal share of what remains after backoff, never less than one second.
    pub fn attempt_timeout(&self) -> Duration {
        let attempts = self.max_retries.saturating_add(1);
        (self.timeout().saturating_sub(self.total_backoff()) / attempts)
            .max(MIN_ATTEMPT_TIMEOUT)
    }

    /// Check if Gemini is configured
    pub fn has_gemini(&self) -> bool {
        self.gemini_api_key
            .as_ref()
            .is_some_and(|k| !k.trim().is_empty())
    }

    /// Validate AI configuration
    ///
    /// A missing API key is allowed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(ValidationError::InvalidAiTimeout);
        }
        if self.model.trim().is_empty() {
            return Err(ValidationError::EmptyModel);
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ValidationError::InvalidBaseUrl(self.base_url.clone()));
        }
        if self.max_retries > 10 {
            return Err(ValidationError::TooManyRetries);
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_timeout() -> u64 {
    20
}

fn default_retries() -> u32 {
    2
}

fn default_retry_base_delay_ms() -> u64 {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_config_defaults() {
        let config = AiConfig::default();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.timeout_secs, 20);
        assert_eq!(config.max_retries, 2);
        assert!(!config.has_gemini());
    }

    #[test]
    fn test_timeout_duration() {
        let config = AiConfig {
            timeout_secs: 60,
            ..Default::default()
        };
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_attempts_and_backoff_fit_reply_timeout() {
        let config = AiConfig::default();

        assert_eq!(config.total_backoff(), Duration::from_secs(3));
        assert_eq!(config.attempt_timeout(), Duration::from_secs(17) / 3);
        assert!(
            config.attempt_timeout() * (config.max_retries + 1) + config.total_backoff()
                <= config.timeout()
        );
    }

    #[test]
    fn test_attempt_timeout_without_retries_is_whole_budget() {
        let config = AiConfig {
            max_retries: 0,
            ..Default::default()
        };
        assert_eq!(config.total_backoff(), Duration::ZERO);
        assert_eq!(config.attempt_timeout(), config.timeout());
    }

    #[test]
    fn test_attempt_timeout_has_floor() {
        let config = AiConfig {
            timeout_secs: 2,
            max_retries: 5,
            ..Default::default()
        };
        assert_eq!(config.attempt_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_blank_key_is_not_configured() {
        let config = AiConfig {
            gemini_api_key: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(!config.has_gemini());
    }

    #[test]
    fn test_validation_allows_missing_key() {
        assert!(AiConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let zero_timeout = AiConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(matches!(zero_timeout.validate(), Err(ValidationError::InvalidAiTimeout)));

        let no_model = AiConfig {
            model: String::new(),
            ..Default::default()
        };
        assert!(matches!(no_model.validate(), Err(ValidationError::EmptyModel)));

        let bad_url = AiConfig {
            base_url: "ftp://example.com".to_string(),
            ..Default::default()
        };
        assert!(matches!(bad_url.validate(), Err(ValidationError::InvalidBaseUrl(_))));

        let retries = AiConfig {
            max_retries: 11,
            ..Default::default()
        };
        assert!(matches!(retries.validate(), Err(ValidationError::TooManyRetries)));
    }
}
