//! Provider used when no AI credentials are configured.
//!
//! Every completion fails with `AIError::Unavailable`, so generative turns
//! land in the persona's fallback replies.

use async_trait::async_trait;

use crate::ports::{AIError, AIProvider, CompletionRequest, CompletionResponse, ProviderInfo};

#[derive(Debug, Clone)]
pub struct UnavailableProvider {
    reason: String,
}

impl UnavailableProvider {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl AIProvider for UnavailableProvider {
    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        Err(AIError::unavailable(self.reason.clone()))
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("unavailable", "none", 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::RequestMetadata;

    #[tokio::test]
    async fn always_fails_with_reason() {
        let provider = UnavailableProvider::new("GEMINI API key not configured");
        let request = CompletionRequest::new(RequestMetadata::new("Cleopatra", "t"));

        let err = provider.complete(request).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "provider unavailable: GEMINI API key not configured"
        );
    }
}
