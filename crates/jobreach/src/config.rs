//! Runtime configuration: daily rate limits and pacing bounds.
//!
//! Loaded from a JSON file with defaults for every field, so an empty
//! `{}` is a valid config. Limits are per automation identity per UTC
//! day; pacing bounds shape the delay between successive sends.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Daily cap on connection requests.
    pub max_connections_per_day: u32,
    /// Daily cap on direct messages.
    pub max_messages_per_day: u32,
    /// Lower bound for the randomized inter-send delay, in seconds.
    pub min_action_delay_secs: f64,
    /// Upper bound for the randomized inter-send delay, in seconds.
    pub max_action_delay_secs: f64,
    /// Maximum people pulled from one platform search.
    pub search_result_limit: usize,
    /// Database location; defaults to `~/.jobreach/data/jobreach.db`.
    pub database_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_connections_per_day: 50,
            max_messages_per_day: 100,
            min_action_delay_secs: 2.0,
            max_action_delay_secs: 5.0,
            search_result_limit: 15,
            database_path: None,
        }
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.min_action_delay_secs < 0.0 {
        return Err(ConfigError::Validation {
            message: "min_action_delay_secs must not be negative".to_string(),
        });
    }
    if config.max_action_delay_secs < config.min_action_delay_secs {
        return Err(ConfigError::Validation {
            message: "max_action_delay_secs must be >= min_action_delay_secs".to_string(),
        });
    }
    if config.search_result_limit == 0 {
        return Err(ConfigError::Validation {
            message: "search_result_limit must be positive".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = load_config_from_str("{}").unwrap();
        assert_eq!(config.max_connections_per_day, 50);
        assert_eq!(config.max_messages_per_day, 100);
        assert_eq!(config.min_action_delay_secs, 2.0);
        assert_eq!(config.max_action_delay_secs, 5.0);
        assert_eq!(config.search_result_limit, 15);
        assert!(config.database_path.is_none());
    }

    #[test]
    fn test_partial_override() {
        let config =
            load_config_from_str(r#"{"max_messages_per_day": 3, "min_action_delay_secs": 0.5}"#)
                .unwrap();
        assert_eq!(config.max_messages_per_day, 3);
        assert_eq!(config.min_action_delay_secs, 0.5);
        assert_eq!(config.max_connections_per_day, 50);
    }

    #[test]
    fn test_invalid_delay_bounds_rejected() {
        let err = load_config_from_str(
            r#"{"min_action_delay_secs": 5.0, "max_action_delay_secs": 2.0}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));

        let err = load_config_from_str(r#"{"min_action_delay_secs": -1.0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(load_config_from_str("not json").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"max_connections_per_day": 7}"#).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.max_connections_per_day, 7);

        assert!(matches!(
            load_config(dir.path().join("missing.json")),
            Err(ConfigError::ReadFile { .. })
        ));
    }
}
