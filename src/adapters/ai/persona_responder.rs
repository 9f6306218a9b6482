//! Persona Prompt Responder - GenerativeResponder over any AIProvider.
//!
//! Builds a role-play prompt from the persona identity, the recent
//! conversation and the user's message, then sends it to the provider as a
//! single user message.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::domain::persona::PersonaIdentity;
use crate::domain::responder::HistoryEntry;
use crate::ports::{AIError, AIProvider, CompletionRequest, GenerativeResponder, MessageRole, RequestMetadata};

/// Generates in-character replies through an `AIProvider`.
pub struct PersonaPromptResponder<P: AIProvider + ?Sized> {
    provider: Arc<P>,
}

impl<P: AIProvider + ?Sized> PersonaPromptResponder<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }
}

/// Renders the role-play prompt sent to the model.
pub fn build_persona_prompt(
    identity: &PersonaIdentity,
    message: &str,
    history: &[HistoryEntry],
) -> String {
    let traits = if identity.traits.is_empty() {
        "None".to_string()
    } else {
        identity.traits.join(", ")
    };

    let mut prompt = format!(
        "You are roleplaying as {}.\n\n\
         Your Character Profile:\n\
         - Tone: {}\n\
         - Key Traits: {}\n",
        identity.name, identity.tone, traits
    );

    if !history.is_empty() {
        prompt.push_str("\nRecent Conversation:\n");
        for entry in history {
            prompt.push_str(&entry.name);
            prompt.push_str(": ");
            prompt.push_str(&entry.text);
            prompt.push('\n');
        }
    }

    prompt.push_str(
        "\nTask:\n\
         Respond to the user's message below.\n\
         Stay strictly in character. Do not break the fourth wall.\n\
         Keep your response concise (under 3 sentences unless asked for a story).\n\n",
    );
    prompt.push_str("User Message: ");
    prompt.push_str(message);

    prompt
}

#[async_trait]
impl<P: AIProvider + ?Sized> GenerativeResponder for PersonaPromptResponder<P> {
    async fn generate(
        &self,
        identity: &PersonaIdentity,
        message: &str,
        history: &[HistoryEntry],
    ) -> Result<String, AIError> {
        let trace_id = Uuid::new_v4().to_string();
        let request = CompletionRequest::new(RequestMetadata::new(&identity.name, &trace_id))
            .with_message(MessageRole::User, build_persona_prompt(identity, message, history));

        debug!(persona = %identity.name, trace_id = %trace_id, history_len = history.len(), "Requesting persona reply");

        let completion = self.provider.complete(request).await?;
        let reply = completion.content.trim();

        if reply.is_empty() {
            return Err(AIError::parse("Empty completion"));
        }

        Ok(reply.to_string())
    }
}
