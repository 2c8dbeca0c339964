//! Engine configuration.
//!
//! Every field has a default matching the behaviour prompts were tuned
//! against; a TOML file only needs to name what it overrides:
//!
//! ```toml
//! surface_every = 4
//! message_cache_ttl_secs = 10
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Tunables for tag lookup, throttling and context composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Cap on tags returned by one lookup.
    pub max_referenced_tags: usize,

    /// A known tag surfaces again once every this many references.
    pub surface_every: u32,

    /// Lifetime of a cached per-message tag lookup.
    pub message_cache_ttl_secs: i64,

    /// Chapters, NPCs and locations listed in the composed context.
    pub recent_items: usize,

    /// Name given to sessions created without one.
    pub default_session_name: String,

    /// Name of the session created for a user who has none.
    pub initial_session_name: String,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_referenced_tags: 5,
            surface_every: 8,
            message_cache_ttl_secs: 30,
            recent_items: 3,
            default_session_name: "Nouvelle Aventure".to_string(),
            initial_session_name: "Aventure sans titre".to_string(),
        }
    }
}

impl MemoryConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MemoryConfig::default();
        assert_eq!(config.max_referenced_tags, 5);
        assert_eq!(config.surface_every, 8);
        assert_eq!(config.message_cache_ttl_secs, 30);
        assert_eq!(config.recent_items, 3);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = MemoryConfig::from_toml_str("surface_every = 4\n").unwrap();
        assert_eq!(config.surface_every, 4);
        assert_eq!(config.max_referenced_tags, 5);
        assert_eq!(config.initial_session_name, "Aventure sans titre");
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            MemoryConfig::from_toml_str("surface_every = \"often\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.toml");
        std::fs::write(&path, "recent_items = 2\n").unwrap();
        assert_eq!(MemoryConfig::load(&path).unwrap().recent_items, 2);
    }
}
