//! Persona Provider Port - read access to loaded persona configurations.

use std::sync::Arc;

use crate::domain::persona::PersonaConfig;

/// Looks up persona configurations by name.
///
/// Backed by a catalog populated at startup; lookups never touch disk and
/// need no synchronization.
pub trait PersonaProvider: Send + Sync {
    /// Returns the persona registered under `name`, if any.
    fn get_persona(&self, name: &str) -> Option<Arc<PersonaConfig>>;

    /// Names of all loaded personas, in load order.
    fn persona_names(&self) -> Vec<String>;
}
