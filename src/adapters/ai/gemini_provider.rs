//! Gemini Provider - Implementation of AIProvider for Google's Generative Language API.
//!
//! # Configuration
//!
//! ```ignore
//! let config = GeminiConfig::new(api_key)
//!     .with_model("gemini-2.5-flash")
//!     .with_timeout(Duration::from_secs(20));
//!
//! let provider = GeminiProvider::new(config)?;
//! ```
//!
//! Requests go to `{base_url}/models/{model}:generateContent` with the API key
//! as the `key` query parameter. Retryable failures (rate limits, 5xx,
//! network errors, timeouts) are retried with exponential backoff.

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, MessageRole,
    ProviderInfo, TokenUsage,
};

/// Default model for persona replies.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Public Generative Language API root.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration for the Gemini provider.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model to use (e.g., "gemini-2.5-flash").
    pub model: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retries on transient failures.
    pub max_retries: u32,
    /// First backoff delay; doubles on every retry.
    pub retry_base_delay: Duration,
}

impl GeminiConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout: Duration::from_secs(20),
            max_retries: 2,
            retry_base_delay: Duration::from_secs(1),
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the maximum retry count.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the initial backoff delay.
    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Gemini API provider implementation.
pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    /// Creates a new Gemini provider with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `AIError::InvalidRequest` if the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> Result<Self, AIError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AIError::InvalidRequest(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn timeout_secs(&self) -> u32 {
        u32::try_from(self.config.timeout.as_secs()).unwrap_or(u32::MAX)
    }

    /// Converts our request to Gemini's format.
    fn to_gemini_request(&self, request: &CompletionRequest) -> GeminiRequest {
        let contents = request
            .messages
            .iter()
            .filter(|msg| msg.role != MessageRole::System)
            .map(|msg| GeminiContent {
                role: Some(
                    match msg.role {
                        MessageRole::Assistant => "model",
                        _ => "user",
                    }
                    .to_string(),
                ),
                parts: vec![GeminiPart {
                    text: msg.content.clone(),
                }],
            })
            .collect();

        // System-role messages are folded into the system instruction.
        let system_text: Vec<&str> = request
            .system_prompt
            .iter()
            .map(String::as_str)
            .chain(
                request
                    .messages
                    .iter()
                    .filter(|msg| msg.role == MessageRole::System)
                    .map(|msg| msg.content.as_str()),
            )
            .collect();

        let system_instruction = if system_text.is_empty() {
            None
        } else {
            Some(GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: system_text.join("\n\n"),
                }],
            })
        };

        let generation_config = if request.max_tokens.is_some() || request.temperature.is_some() {
            Some(GenerationConfig {
                max_output_tokens: request.max_tokens,
                temperature: request.temperature,
            })
        } else {
            None
        };

        GeminiRequest {
            contents,
            system_instruction,
            generation_config,
        }
    }

    async fn send_request(&self, request: &CompletionRequest) -> Result<Response, AIError> {
        let body = self.to_gemini_request(request);

        self.client
            .post(self.generate_url())
            .query(&[("key", self.config.api_key())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AIError::Timeout {
                        timeout_secs: self.timeout_secs(),
                    }
                } else if e.is_connect() {
                    AIError::network(format!("Connection failed: {}", e.without_url()))
                } else {
                    AIError::network(e.without_url().to_string())
                }
            })
    }

    async fn parse_response(&self, response: Response) -> Result<CompletionResponse, AIError> {
        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(error_for_status(status.as_u16(), &error_body));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| AIError::parse(format!("Failed to parse response: {}", e.without_url())))?;

        into_completion(gemini_response, &self.config.model)
    }

    async fn attempt(&self, request: &CompletionRequest) -> Result<CompletionResponse, AIError> {
        let response = self.send_request(request).await?;
        self.parse_response(response).await
    }
}

#[async_trait]
impl AIProvider for GeminiProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let mut retry_count = 0;

        loop {
            match self.attempt(&request).await {
                Ok(completion) => {
                    debug!(
                        persona = %request.metadata.persona,
                        trace_id = %request.metadata.trace_id,
                        total_tokens = completion.usage.total_tokens,
                        "Gemini completion received"
                    );
                    return Ok(completion);
                }
                Err(err) => {
                    if !err.is_retryable() || retry_count >= self.config.max_retries {
                        return Err(err);
                    }
                    warn!(
                        trace_id = %request.metadata.trace_id,
                        attempt = retry_count + 1,
                        error = %err,
                        "Gemini request failed, retrying"
                    );
                }
            }

            // Exponential backoff: base, 2x base, 4x base, ...
            sleep(self.config.retry_base_delay * (1u32 << retry_count.min(16))).await;
            retry_count += 1;
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("gemini", &self.config.model, 1_048_576)
    }
}

/// Maps a non-success HTTP status to an `AIError`.
fn error_for_status(status: u16, error_body: &str) -> AIError {
    match status {
        401 | 403 => AIError::AuthenticationFailed,
        429 => AIError::rate_limited(parse_retry_after(error_body)),
        400 => AIError::InvalidRequest(error_message(error_body)),
        500..=599 => AIError::unavailable(format!(
            "Server error {}: {}",
            status,
            error_message(error_body)
        )),
        _ => AIError::network(format!(
            "Unexpected status {}: {}",
            status,
            error_message(error_body)
        )),
    }
}

/// Extracts `error.message` from a Gemini error body, or returns the body.
fn error_message(error_body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(error_body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| error_body.to_string())
}

/// Parses the `RetryInfo.retryDelay` detail (e.g. `"17s"`), defaulting to 30 seconds.
fn parse_retry_after(error_body: &str) -> u32 {
    let parsed: serde_json::Value = match serde_json::from_str(error_body) {
        Ok(v) => v,
        Err(_) => return 30,
    };

    parsed
        .get("error")
        .and_then(|e| e.get("details"))
        .and_then(|d| d.as_array())
        .and_then(|details| {
            details
                .iter()
                .filter_map(|detail| detail.get("retryDelay").and_then(|r| r.as_str()))
                .find_map(|delay| {
                    let secs = delay.trim_end_matches('s');
                    secs.split('.').next().and_then(|whole| whole.parse::<u32>().ok())
                })
        })
        .unwrap_or(30)
}

/// Converts a successful Gemini body into a completion.
fn into_completion(response: GeminiResponse, model: &str) -> Result<CompletionResponse, AIError> {
    let candidate = match response.candidates.into_iter().next() {
        Some(candidate) => candidate,
        None => {
            return Err(match response.prompt_feedback.and_then(|f| f.block_reason) {
                Some(reason) => AIError::content_filtered(reason),
                None => AIError::parse("No candidates in response"),
            });
        }
    };

    let finish_reason = match candidate.finish_reason.as_deref() {
        Some("STOP") | None => FinishReason::Stop,
        Some("MAX_TOKENS") => FinishReason::Length,
        Some("SAFETY") | Some("RECITATION") | Some("BLOCKLIST") | Some("PROHIBITED_CONTENT") => {
            FinishReason::ContentFilter
        }
        Some(_) => FinishReason::Error,
    };

    let content: String = candidate
        .content
        .map(|c| c.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();

    if content.is_empty() && finish_reason == FinishReason::ContentFilter {
        return Err(AIError::content_filtered(
            candidate.finish_reason.unwrap_or_default(),
        ));
    }

    let usage = response
        .usage_metadata
        .map(|u| TokenUsage::new(u.prompt_token_count, u.candidates_token_count))
        .unwrap_or_default();

    Ok(CompletionResponse {
        content,
        usage,
        model: response.model_version.unwrap_or_else(|| model.to_string()),
        finish_reason,
    })
}

// ----- Gemini API Types -----

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::RequestMetadata;
    use axum::{extract::State, http::StatusCode, Json, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn test_request() -> CompletionRequest {
        CompletionRequest::new(RequestMetadata::new("Cleopatra", "trace-123"))
            .with_message(MessageRole::User, "Who are you?")
    }

    fn provider(config: GeminiConfig) -> GeminiProvider {
        GeminiProvider::new(config).unwrap()
    }

    fn success_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 8, "totalTokenCount": 20 },
            "modelVersion": "gemini-2.5-flash"
        })
    }

    /// Serves `responses` in order (repeating the last) and counts hits.
    async fn spawn_gemini(
        responses: Vec<(StatusCode, serde_json::Value)>,
    ) -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let responses = Arc::new(responses);

        let app = Router::new()
            .fallback(
                |State((hits, responses)): State<(
                    Arc<AtomicUsize>,
                    Arc<Vec<(StatusCode, serde_json::Value)>>,
                )>| async move {
                    let n = hits.fetch_add(1, Ordering::SeqCst);
                    let (status, body) = responses[n.min(responses.len() - 1)].clone();
                    (status, Json(body))
                },
            )
            .with_state((hits.clone(), responses));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), hits)
    }

    #[test]
    fn config_builder_works() {
        let config = GeminiConfig::new("test-key")
            .with_model("gemini-2.0-pro")
            .with_base_url("http://localhost:9999")
            .with_timeout(Duration::from_secs(5))
            .with_max_retries(4);

        assert_eq!(config.model, "gemini-2.0-pro");
        assert_eq!(config.base_url, "http://localhost:9999");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.max_retries, 4);
        assert_eq!(config.api_key(), "test-key");
    }

    #[test]
    fn config_debug_redacts_key() {
        let config = GeminiConfig::new("super-secret-key");
        assert!(!format!("{:?}", config).contains("super-secret-key"));
    }

    #[test]
    fn defaults_match_flash_model() {
        let config = GeminiConfig::new("k");
        assert_eq!(config.model, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.timeout, Duration::from_secs(20));
    }

    #[test]
    fn generate_url_includes_model() {
        let p = provider(GeminiConfig::new("k").with_base_url("http://host/v1beta/"));
        assert_eq!(
            p.generate_url(),
            "http://host/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn request_maps_roles_and_system_prompt() {
        let p = provider(GeminiConfig::new("k"));
        let request = CompletionRequest::new(RequestMetadata::new("Cleopatra", "t"))
            .with_system_prompt("Stay in character")
            .with_message(MessageRole::User, "Hi")
            .with_message(MessageRole::Assistant, "Greetings")
            .with_temperature(0.5);

        let json = serde_json::to_value(p.to_gemini_request(&request)).unwrap();

        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][1]["role"], "model");
        assert_eq!(json["contents"][1]["parts"][0]["text"], "Greetings");
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "Stay in character");
        assert_eq!(json["generationConfig"]["temperature"], 0.5);
        assert!(json["generationConfig"].get("maxOutputTokens").is_none());
    }

    #[test]
    fn request_without_extras_is_minimal() {
        let p = provider(GeminiConfig::new("k"));
        let json = serde_json::to_value(p.to_gemini_request(&test_request())).unwrap();

        assert!(json.get("systemInstruction").is_none());
        assert!(json.get("generationConfig").is_none());
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(error_for_status(401, ""), AIError::AuthenticationFailed));
        assert!(matches!(error_for_status(403, ""), AIError::AuthenticationFailed));
        assert!(matches!(error_for_status(429, "{}"), AIError::RateLimited { retry_after_secs: 30 }));
        assert!(matches!(error_for_status(400, "bad"), AIError::InvalidRequest(_)));
        assert!(matches!(error_for_status(503, ""), AIError::Unavailable { .. }));
        assert!(matches!(error_for_status(418, ""), AIError::Network(_)));
    }

    #[test]
    fn invalid_request_uses_error_message() {
        let body = r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
        match error_for_status(400, body) {
            AIError::InvalidRequest(msg) => assert_eq!(msg, "API key not valid"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parse_retry_after_from_details() {
        let body = r#"{"error":{"code":429,"details":[{"@type":"type.googleapis.com/google.rpc.RetryInfo","retryDelay":"17s"}]}}"#;
        assert_eq!(parse_retry_after(body), 17);

        let fractional = r#"{"error":{"details":[{"retryDelay":"2.5s"}]}}"#;
        assert_eq!(parse_retry_after(fractional), 2);

        assert_eq!(parse_retry_after("not json"), 30);
    }

    #[test]
    fn completion_joins_parts_and_reads_usage() {
        let body: GeminiResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "I am " }, { "text": "Cleopatra." }] },
                "finishReason": "MAX_TOKENS"
            }],
            "usageMetadata": { "promptTokenCount": 3, "candidatesTokenCount": 4 }
        }))
        .unwrap();

        let completion = into_completion(body, "gemini-2.5-flash").unwrap();

        assert_eq!(completion.content, "I am Cleopatra.");
        assert_eq!(completion.finish_reason, FinishReason::Length);
        assert_eq!(completion.usage.total_tokens, 7);
        assert_eq!(completion.model, "gemini-2.5-flash");
    }

    #[test]
    fn blocked_prompt_is_content_filtered() {
        let body: GeminiResponse = serde_json::from_value(serde_json::json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .unwrap();

        let err = into_completion(body, "m").unwrap_err();
        assert!(matches!(err, AIError::ContentFiltered { .. }));
    }

    #[test]
    fn empty_candidates_is_parse_error() {
        let body: GeminiResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(matches!(into_completion(body, "m"), Err(AIError::Parse(_))));
    }

    #[tokio::test]
    async fn complete_round_trips_over_http() {
        let (base_url, hits) = spawn_gemini(vec![(StatusCode::OK, success_body("Hail, traveller."))]).await;
        let p = provider(GeminiConfig::new("k").with_base_url(base_url));

        let completion = p.complete(test_request()).await.unwrap();

        assert_eq!(completion.content, "Hail, traveller.");
        assert_eq!(completion.usage.total_tokens, 20);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn complete_retries_server_errors() {
        let (base_url, hits) = spawn_gemini(vec![
            (StatusCode::SERVICE_UNAVAILABLE, serde_json::json!({"error": {"message": "overloaded"}})),
            (StatusCode::OK, success_body("Second time lucky.")),
        ])
        .await;
        let p = provider(
            GeminiConfig::new("k")
                .with_base_url(base_url)
                .with_max_retries(2)
                .with_retry_base_delay(Duration::from_millis(1)),
        );

        let completion = p.complete(test_request()).await.unwrap();

        assert_eq!(completion.content, "Second time lucky.");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn complete_does_not_retry_auth_failures() {
        let (base_url, hits) = spawn_gemini(vec![(
            StatusCode::UNAUTHORIZED,
            serde_json::json!({"error": {"message": "denied"}}),
        )])
        .await;
        let p = provider(
            GeminiConfig::new("k")
                .with_base_url(base_url)
                .with_retry_base_delay(Duration::from_millis(1)),
        );

        let err = p.complete(test_request()).await.unwrap_err();

        assert!(matches!(err, AIError::AuthenticationFailed));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn complete_gives_up_after_max_retries() {
        let (base_url, hits) = spawn_gemini(vec![(
            StatusCode::INTERNAL_SERVER_ERROR,
            serde_json::json!({"error": {"message": "boom"}}),
        )])
        .await;
        let p = provider(
            GeminiConfig::new("k")
                .with_base_url(base_url)
                .with_max_retries(2)
                .with_retry_base_delay(Duration::from_millis(1)),
        );

        let err = p.complete(test_request()).await.unwrap_err();

        assert!(matches!(err, AIError::Unavailable { .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }
}
