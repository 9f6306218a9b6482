//! File-backed persona catalog.
//!
//! Personas are read once at startup from JSON files and kept in memory for
//! the lifetime of the process. A file that is missing or cannot be parsed
//! is logged and skipped; the catalog still serves whatever loaded.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::fs;
use tracing::{error, info, warn};

use crate::config::PersonaEntry;
use crate::domain::persona::{check_references, PersonaConfig};
use crate::ports::PersonaProvider;

/// Errors reading a single persona file.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("persona file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read persona file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid persona JSON in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// In-memory catalog of persona configurations, in load order.
#[derive(Debug, Clone, Default)]
pub struct FilePersonaCatalog {
    personas: Vec<(String, Arc<PersonaConfig>)>,
}

impl FilePersonaCatalog {
    /// Loads every entry relative to `base_dir`.
    ///
    /// Never fails as a whole: unreadable entries are logged and skipped.
    pub async fn load(base_dir: impl AsRef<Path>, entries: &[PersonaEntry]) -> Self {
        let base_dir = base_dir.as_ref();
        let mut catalog = Self::default();

        for entry in entries {
            let path = base_dir.join(&entry.file);
            match load_persona_file(&path).await {
                Ok(persona) => {
                    for issue in check_references(&persona) {
                        warn!(persona = %entry.name, issue = %issue, "Persona dialogue tree reference problem");
                    }
                    info!(
                        persona = %entry.name,
                        topics = persona.topics.len(),
                        trees = persona.dialogue_trees.len(),
                        "Loaded persona"
                    );
                    catalog.insert(entry.name.clone(), persona);
                }
                Err(err @ CatalogError::NotFound { .. }) => {
                    warn!(persona = %entry.name, error = %err, "Skipping persona");
                }
                Err(err) => {
                    error!(persona = %entry.name, error = %err, "Failed to load persona");
                }
            }
        }

        catalog
    }

    /// Builds a catalog from configurations already in memory.
    pub fn from_personas<I, S>(personas: I) -> Self
    where
        I: IntoIterator<Item = (S, PersonaConfig)>,
        S: Into<String>,
    {
        let mut catalog = Self::default();
        for (name, persona) in personas {
            catalog.insert(name.into(), persona);
        }
        catalog
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }

    fn insert(&mut self, name: String, persona: PersonaConfig) {
        let persona = Arc::new(persona);
        match self.personas.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = persona,
            None => self.personas.push((name, persona)),
        }
    }
}

impl PersonaProvider for FilePersonaCatalog {
    fn get_persona(&self, name: &str) -> Option<Arc<PersonaConfig>> {
        let exact = self.personas.iter().find(|(key, _)| key == name);
        let found = exact.or_else(|| {
            let wanted = name.to_lowercase();
            self.personas
                .iter()
                .find(|(key, _)| key.to_lowercase() == wanted)
        });
        found.map(|(_, persona)| Arc::clone(persona))
    }

    fn persona_names(&self) -> Vec<String> {
        self.personas.iter().map(|(name, _)| name.clone()).collect()
    }
}

/// Reads and parses one persona JSON file.
pub async fn load_persona_file(path: &Path) -> Result<PersonaConfig, CatalogError> {
    let content = fs::read_to_string(path).await.map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            CatalogError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            CatalogError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let parse_error = |source: serde_json::Error| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    };

    // All sections are optional; only an object describes a persona.
    let value: serde_json::Value = serde_json::from_str(&content).map_err(parse_error)?;
    if !value.is_object() {
        return Err(parse_error(serde::de::Error::custom(
            "persona file must contain a JSON object",
        )));
    }

    serde_json::from_value(value).map_err(parse_error)
}
