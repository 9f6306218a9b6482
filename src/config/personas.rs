//! Persona catalog configuration

use serde::{Deserialize, Deserializer};
use std::path::PathBuf;

use super::error::ValidationError;

/// One persona to load: display name and JSON file relative to `base_dir`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PersonaEntry {
    pub name: String,
    pub file: PathBuf,
}

impl PersonaEntry {
    pub fn new(name: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
        }
    }
}

/// Persona catalog configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PersonasConfig {
    /// Directory persona file paths are resolved against
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// Personas to load, in order. From the environment this is a
    /// comma-separated list of `Name=path` pairs.
    #[serde(default = "default_entries", deserialize_with = "deserialize_entries")]
    pub entries: Vec<PersonaEntry>,
}

impl PersonasConfig {
    /// Validate persona configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.entries.is_empty() {
            return Err(ValidationError::NoPersonas);
        }
        for entry in &self.entries {
            if entry.name.trim().is_empty() || entry.file.as_os_str().is_empty() {
                return Err(ValidationError::InvalidPersonaEntry(format!(
                    "{}={}",
                    entry.name,
                    entry.file.display()
                )));
            }
        }
        Ok(())
    }
}

impl Default for PersonasConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            entries: default_entries(),
        }
    }
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_entries() -> Vec<PersonaEntry> {
    vec![
        PersonaEntry::new("Cleopatra", "persona-responses/cleopatra_advanced.json"),
        PersonaEntry::new("Tutankhamun", "persona-responses/tutankhamun_advanced.json"),
        PersonaEntry::new("Ramesses II", "persona-responses/ramesses-ii_advanced.json"),
    ]
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EntriesInput {
    List(Vec<PersonaEntry>),
    Text(String),
}

fn deserialize_entries<'de, D>(deserializer: D) -> Result<Vec<PersonaEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    match EntriesInput::deserialize(deserializer)? {
        EntriesInput::List(entries) => Ok(entries),
        EntriesInput::Text(text) => parse_entries(&text).map_err(serde::de::Error::custom),
    }
}

/// Parses `Name=path, Other Name=other/path`.
pub fn parse_entries(text: &str) -> Result<Vec<PersonaEntry>, ValidationError> {
    text.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, file) = pair
                .split_once('=')
                .ok_or_else(|| ValidationError::InvalidPersonaEntry(pair.to_string()))?;
            Ok(PersonaEntry::new(name.trim(), file.trim()))
        })
        .collect()
}
