//! Persona configuration data model.
//!
//! Mirrors the persona JSON files: keyword topics, weighted canned responses,
//! dialogue trees and the character identity used for generative replies.
//! A `PersonaConfig` is immutable once loaded and shared read-only between
//! concurrent requests.

use serde::{Deserialize, Deserializer, Serialize};

use super::OrderedMap;

/// Response bucket consulted when the generative responder fails.
pub const FALLBACK_TOPIC: &str = "fallback";

/// Step every dialogue tree is entered at.
pub const START_STEP: &str = "start";

/// Complete configuration for one persona.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaConfig {
    /// Character identity forwarded to the generative responder.
    #[serde(default)]
    pub persona: PersonaIdentity,

    /// Topic key -> keywords. Order decides match priority.
    #[serde(default)]
    pub topics: OrderedMap<Vec<String>>,

    /// Topic key -> weighted replies.
    #[serde(default)]
    pub responses: OrderedMap<Vec<ResponseCandidate>>,

    /// Tree name -> dialogue tree. Order decides trigger priority.
    #[serde(default)]
    pub dialogue_trees: OrderedMap<DialogueTree>,
}

impl PersonaConfig {
    /// Canned replies for the given topic, empty when none are configured.
    pub fn responses_for(&self, topic: &str) -> &[ResponseCandidate] {
        self.responses
            .get(topic)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Persona-defined replies for the error fallback path.
    pub fn fallback_responses(&self) -> &[ResponseCandidate] {
        self.responses_for(FALLBACK_TOPIC)
    }
}

/// Display name, tone and traits of a persona.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaIdentity {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tone: String,
    #[serde(default)]
    pub traits: Vec<String>,
}

impl PersonaIdentity {
    pub fn new(name: impl Into<String>, tone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tone: tone.into(),
            traits: Vec::new(),
        }
    }

    pub fn with_trait(mut self, value: impl Into<String>) -> Self {
        self.traits.push(value.into());
        self
    }
}

/// A canned reply with its selection weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseCandidate {
    pub text: String,
    /// Relative weight. Absent or null means 1; zero or negative values are kept as given.
    #[serde(default = "default_probability", deserialize_with = "probability_or_default")]
    pub probability: f64,
}

impl ResponseCandidate {
    pub fn new(text: impl Into<String>, probability: f64) -> Self {
        Self {
            text: text.into(),
            probability,
        }
    }
}

fn default_probability() -> f64 {
    1.0
}

fn probability_or_default<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_else(default_probability))
}

/// A scripted multi-turn conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogueTree {
    /// Whole words that open this tree.
    #[serde(default)]
    pub triggers: Vec<String>,
    #[serde(default)]
    pub steps: OrderedMap<StepDefinition>,
}

impl DialogueTree {
    pub fn with_trigger(mut self, trigger: impl Into<String>) -> Self {
        self.triggers.push(trigger.into());
        self
    }

    pub fn with_step(mut self, key: impl Into<String>, step: StepDefinition) -> Self {
        self.steps.insert(key, step);
        self
    }

    pub fn step(&self, key: &str) -> Option<&StepDefinition> {
        self.steps.get(key)
    }
}

/// One node of a dialogue tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepDefinition {
    /// What the persona says on reaching this step.
    #[serde(rename = "bot", default)]
    pub bot_text: String,

    /// Matchable keyword phrase -> branch. Keys are expected in lower case.
    #[serde(default)]
    pub options: OrderedMap<StepOption>,

    /// Step taken when no option matches.
    #[serde(
        rename = "defaultNext",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub default_next: Option<String>,

    /// Reaching a terminal step ends the tree session.
    #[serde(rename = "end", default)]
    pub terminal: bool,
}

impl StepDefinition {
    pub fn new(bot_text: impl Into<String>) -> Self {
        Self {
            bot_text: bot_text.into(),
            ..Default::default()
        }
    }

    pub fn terminal(bot_text: impl Into<String>) -> Self {
        Self {
            bot_text: bot_text.into(),
            terminal: true,
            ..Default::default()
        }
    }

    pub fn with_option(mut self, keyword: impl Into<String>, next_step: impl Into<String>) -> Self {
        self.options.insert(
            keyword,
            StepOption {
                next_step: next_step.into(),
            },
        );
        self
    }

    pub fn with_default_next(mut self, next_step: impl Into<String>) -> Self {
        self.default_next = Some(next_step.into());
        self
    }
}

/// Branch target of a step option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOption {
    #[serde(rename = "nextStep")]
    pub next_step: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "name": "Cleopatra",
        "role": "Queen of Egypt",
        "persona": {
            "name": "Cleopatra VII",
            "tone": "regal and witty",
            "traits": ["strategic", "charming"]
        },
        "topics": {
            "greetings": ["hello", "hi"],
            "rome": ["caesar", "antony"]
        },
        "responses": {
            "greetings": [{ "text": "Greetings, traveller.", "probability": 0.7 }, { "text": "Welcome." }],
            "fallback": [{ "text": "The Nile whispers nothing.", "probability": 1 }]
        },
        "dialogueTrees": {
            "alliance": {
                "triggers": ["alliance"],
                "steps": {
                    "start": {
                        "bot": "Rome or Egypt?",
                        "options": {
                            "rome": { "nextStep": "rome" },
                            "egypt": { "nextStep": "egypt" }
                        },
                        "defaultNext": "egypt"
                    },
                    "rome": { "bot": "A bold choice.", "end": true },
                    "egypt": { "bot": "Loyal to the Nile.", "end": true }
                }
            }
        }
    }"#;

    #[test]
    fn parses_persona_file_format() {
        let config: PersonaConfig = serde_json::from_str(SAMPLE).unwrap();

        assert_eq!(config.persona.name, "Cleopatra VII");
        assert_eq!(config.persona.traits, vec!["strategic", "charming"]);

        let topics: Vec<&str> = config.topics.keys().collect();
        assert_eq!(topics, vec!["greetings", "rome"]);

        let tree = config.dialogue_trees.get("alliance").unwrap();
        let start = tree.step(START_STEP).unwrap();
        assert_eq!(start.bot_text, "Rome or Egypt?");
        assert_eq!(start.default_next.as_deref(), Some("egypt"));
        let options: Vec<&str> = start.options.keys().collect();
        assert_eq!(options, vec!["rome", "egypt"]);
        assert!(tree.step("rome").unwrap().terminal);
    }

    #[test]
    fn probability_defaults_to_one() {
        let config: PersonaConfig = serde_json::from_str(SAMPLE).unwrap();
        let greetings = config.responses_for("greetings");

        assert_eq!(greetings[0].probability, 0.7);
        assert_eq!(greetings[1].probability, 1.0);
    }

    #[test]
    fn null_probability_counts_as_default_weight() {
        let config: PersonaConfig = serde_json::from_str(
            r#"{"responses":{"greetings":[{"text":"Hail.","probability":null},{"text":"Well met.","probability":0.25}]}}"#,
        )
        .unwrap();
        let greetings = config.responses_for("greetings");

        assert_eq!(greetings[0].probability, 1.0);
        assert_eq!(greetings[1].probability, 0.25);
    }

    #[test]
    fn fallback_responses_read_fallback_bucket() {
        let config: PersonaConfig = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(config.fallback_responses()[0].text, "The Nile whispers nothing.");
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let config: PersonaConfig = serde_json::from_str("{}").unwrap();

        assert!(config.topics.is_empty());
        assert!(config.dialogue_trees.is_empty());
        assert!(config.fallback_responses().is_empty());
        assert_eq!(config.persona, PersonaIdentity::default());
    }

    #[test]
    fn builders_produce_equivalent_steps() {
        let step = StepDefinition::new("Choose")
            .with_option("left", "l")
            .with_default_next("r");

        assert_eq!(step.options.get("left").unwrap().next_step, "l");
        assert_eq!(step.default_next.as_deref(), Some("r"));
        assert!(!step.terminal);
        assert!(StepDefinition::terminal("Bye").terminal);
    }
}
