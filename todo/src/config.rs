//! Configuration for the taskpad binary.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::persistence::DEFAULT_STORAGE_KEY;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use taskpad_runtime::file_store::is_valid_key;
use thiserror::Error;

/// Errors found when validating a [`Config`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Storage keys become file names and may only use `[A-Za-z0-9_-]`
    #[error("Invalid TASKPAD_STORAGE_KEY {0:?}: use letters, digits, '_' or '-'")]
    InvalidStorageKey(String),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the persisted state (`TASKPAD_DATA_DIR`)
    pub data_dir: PathBuf,
    /// Key the todo list is stored under (`TASKPAD_STORAGE_KEY`)
    pub storage_key: String,
    /// `tracing` filter directive (`TASKPAD_LOG`)
    pub log_filter: String,
    /// Install the Prometheus recorder (`TASKPAD_METRICS`)
    pub metrics: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./taskpad-data"),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            log_filter: "taskpad=info".to_string(),
            metrics: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparseable variables fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from any variable source
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            data_dir: lookup("TASKPAD_DATA_DIR").map_or(defaults.data_dir, PathBuf::from),
            storage_key: lookup("TASKPAD_STORAGE_KEY").unwrap_or(defaults.storage_key),
            log_filter: lookup("TASKPAD_LOG").unwrap_or(defaults.log_filter),
            metrics: lookup("TASKPAD_METRICS")
                .and_then(|s| parse_bool(&s))
                .unwrap_or(defaults.metrics),
        }
    }

    /// Check values the defaults cannot repair
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidStorageKey`] for an empty key or one
    /// with characters outside `[A-Za-z0-9_-]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_valid_key(&self.storage_key) {
            return Err(ConfigError::InvalidStorageKey(self.storage_key.clone()));
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config, Config::default());
        assert_eq!(config.storage_key, "todoItems");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn reads_every_variable() {
        let config = Config::from_lookup(lookup(&[
            ("TASKPAD_DATA_DIR", "/tmp/todos"),
            ("TASKPAD_STORAGE_KEY", "work-items"),
            ("TASKPAD_LOG", "debug"),
            ("TASKPAD_METRICS", "yes"),
        ]));

        assert_eq!(config.data_dir, PathBuf::from("/tmp/todos"));
        assert_eq!(config.storage_key, "work-items");
        assert_eq!(config.log_filter, "debug");
        assert!(config.metrics);
    }

    #[test]
    fn unparseable_bool_falls_back() {
        let config = Config::from_lookup(lookup(&[("TASKPAD_METRICS", "sometimes")]));
        assert!(!config.metrics);
    }

    #[test]
    fn rejects_path_like_keys() {
        let config = Config::from_lookup(lookup(&[("TASKPAD_STORAGE_KEY", "../etc")]));
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidStorageKey("../etc".to_string()))
        );
    }

    #[test]
    fn rejects_empty_key() {
        let config = Config::from_lookup(lookup(&[("TASKPAD_STORAGE_KEY", "")]));
        assert!(config.validate().is_err());
    }
}
