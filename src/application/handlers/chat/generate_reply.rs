//! ResponseOrchestrator - resolves one chat turn into a reply envelope.
//!
//! Strategies are tried strictly in order:
//!
//! 1. an already active dialogue tree,
//! 2. a dialogue tree whose trigger appears in the message,
//! 3. a keyword topic with canned replies,
//! 4. the generative responder, falling back to the persona's `fallback`
//!    replies when generation fails or times out.
//!
//! `generate_reply` never returns an error.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::persona::PersonaConfig;
use crate::domain::responder::{
    DialogueTreeEngine, HistoryEntry, ResponseEnvelope, ResponseMode, TopicMatcher, TreeState,
    WeightedSelector,
};
use crate::ports::{AIError, GenerativeResponder};

/// Reply used when generation fails and the persona has no fallback replies.
pub const LOST_FOR_WORDS_REPLY: &str = "I am lost for words.";

/// Upper bound on a single generative call unless configured otherwise.
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(20);

/// Handler that cascades through the reply strategies for a persona.
#[derive(Clone)]
pub struct ResponseOrchestrator {
    responder: Arc<dyn GenerativeResponder>,
    selector: WeightedSelector,
    engine: DialogueTreeEngine,
    topics: TopicMatcher,
    generation_timeout: Duration,
}

impl ResponseOrchestrator {
    pub fn new(responder: Arc<dyn GenerativeResponder>) -> Self {
        Self {
            responder,
            selector: WeightedSelector::default(),
            engine: DialogueTreeEngine,
            topics: TopicMatcher,
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }

    /// Replaces the selector, typically with a deterministic random source.
    pub fn with_selector(mut self, selector: WeightedSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    pub fn generation_timeout(&self) -> Duration {
        self.generation_timeout
    }

    /// Produces the reply for one user turn.
    pub async fn generate_reply(
        &self,
        message: &str,
        persona: &PersonaConfig,
        tree_state: Option<TreeState>,
        history: &[HistoryEntry],
    ) -> ResponseEnvelope {
        let persona_name = persona.persona.name.as_str();

        // 1. Active dialogue tree
        if let Some(state) = tree_state {
            debug!(persona = %persona_name, tree = %state.name, step = %state.step, "Advancing dialogue tree");
            return self.engine.advance(message, &state, &persona.dialogue_trees);
        }

        // 2. New dialogue tree
        if let Some(state) = self.engine.detect_trigger(message, &persona.dialogue_trees) {
            debug!(persona = %persona_name, tree = %state.name, "Dialogue tree triggered");
            return self.engine.start(state, &persona.dialogue_trees);
        }

        // 3. Keyword topic
        if let Some(topic) = self.topics.detect_topic(message, &persona.topics) {
            if let Some(candidate) = self.selector.select(persona.responses_for(topic)) {
                debug!(persona = %persona_name, topic = %topic, "Topic matched");
                return ResponseEnvelope::new(candidate.text.clone(), ResponseMode::TopicMatch);
            }
            debug!(persona = %persona_name, topic = %topic, "Topic matched without replies");
        }

        // 4. Generative responder
        match self.generate(persona, message, history).await {
            Ok(text) => ResponseEnvelope::new(text, ResponseMode::AiFallback),
            Err(err) => {
                warn!(persona = %persona_name, error = %err, "Generative reply failed, using fallback");
                self.error_fallback(persona)
            }
        }
    }

    async fn generate(
        &self,
        persona: &PersonaConfig,
        message: &str,
        history: &[HistoryEntry],
    ) -> Result<String, AIError> {
        let call = self.responder.generate(&persona.persona, message, history);
        match tokio::time::timeout(self.generation_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(AIError::Timeout {
                timeout_secs: u32::try_from(self.generation_timeout.as_secs()).unwrap_or(u32::MAX),
            }),
        }
    }

    fn error_fallback(&self, persona: &PersonaConfig) -> ResponseEnvelope {
        let reply = self
            .selector
            .select(persona.fallback_responses())
            .map(|candidate| candidate.text.as_str())
            .unwrap_or(LOST_FOR_WORDS_REPLY);
        ResponseEnvelope::new(reply, ResponseMode::ErrorFallback)
    }
}

impl std::fmt::Debug for ResponseOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseOrchestrator")
            .field("selector", &self.selector)
            .field("generation_timeout", &self.generation_timeout)
            .finish_non_exhaustive()
    }
}
