//! Automaton Configuration
//! Behaviour switches, loadable from the environment or a JSON document

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable that turns on removal notifications
pub const NOTIFY_ON_REMOVE_ENV: &str = "FSAKIT_NOTIFY_ON_REMOVE";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Runtime behaviour of an [`Automaton`](crate::Automaton)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomatonConfig {
    /// Fire "states changed"/"transitions changed" after removals too.
    ///
    /// Off by default: only additions are announced to automaton listeners.
    pub notify_on_remove: bool,
}

impl AutomatonConfig {
    /// Defaults overridden by `FSAKIT_NOTIFY_ON_REMOVE`, if set
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(value) = std::env::var(NOTIFY_ON_REMOVE_ENV) {
            config.notify_on_remove = parse_flag(&value);
        }
        config
    }

    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn with_notify_on_remove(mut self, enabled: bool) -> Self {
        self.notify_on_remove = enabled;
        self
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_keeps_removals_silent() {
        assert!(!AutomatonConfig::default().notify_on_remove);
    }

    #[test]
    fn test_from_json_fills_missing_fields() {
        let config = AutomatonConfig::from_json("{}").unwrap();
        assert_eq!(config, AutomatonConfig::default());

        let config = AutomatonConfig::from_json(r#"{"notify_on_remove": true}"#).unwrap();
        assert!(config.notify_on_remove);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            AutomatonConfig::from_json("notify"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fsakit.json");
        fs::write(&path, r#"{"notify_on_remove": true}"#).unwrap();

        let config = AutomatonConfig::from_json_file(&path).unwrap();
        assert!(config.notify_on_remove);

        let missing = AutomatonConfig::from_json_file(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_parse_flag() {
        for on in ["1", "true", "TRUE", " yes ", "on"] {
            assert!(parse_flag(on), "{on}");
        }
        for off in ["0", "false", "", "nope"] {
            assert!(!parse_flag(off), "{off}");
        }
    }
}
