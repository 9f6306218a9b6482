//! Persona catalog adapters.

mod file_catalog;

pub use file_catalog::{load_persona_file, CatalogError, FilePersonaCatalog};
