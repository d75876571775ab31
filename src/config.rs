//! Configuration System
//!
//! Hierarchical configuration with environment variable overrides: an
//! optional TOML file, then `NOTETREE_*` variables on top, then defaults.

use crate::error::SyncError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotetreeConfig {
    /// Remote store endpoint settings
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote store endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the notes API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token, if the store requires one
    #[serde(default)]
    pub token: Option<String>,

    /// Connect timeout in seconds
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,

    /// Per-request timeout in seconds
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "http://localhost:8700".to_string()
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            connect_timeout_secs: None,
            request_timeout_secs: None,
        }
    }
}

impl NotetreeConfig {
    /// Load configuration from an optional TOML file plus `NOTETREE_*`
    /// environment overrides (e.g. `NOTETREE_REMOTE__BASE_URL`).
    pub fn load(file: Option<&Path>) -> Result<Self, SyncError> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("NOTETREE")
                .separator("__")
                .try_parsing(true),
        );
        let loaded: Self = builder.build()?.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.remote.base_url.is_empty() {
            return Err(SyncError::ConfigError(
                "Remote base URL cannot be empty".to_string(),
            ));
        }
        if !self.remote.base_url.starts_with("http://")
            && !self.remote.base_url.starts_with("https://")
        {
            return Err(SyncError::ConfigError(format!(
                "Remote base URL must be http(s): {}",
                self.remote.base_url
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = NotetreeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.remote.base_url, "http://localhost:8700");
        assert!(config.remote.token.is_none());
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let mut config = NotetreeConfig::default();
        config.remote.base_url = "ftp://notes.example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parses_toml() {
        let parsed: NotetreeConfig = toml::from_str(
            r#"
            [remote]
            base_url = "https://notes.example.com/api"
            token = "t0k3n"
            request_timeout_secs = 15

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.remote.base_url, "https://notes.example.com/api");
        assert_eq!(parsed.remote.token.as_deref(), Some("t0k3n"));
        assert_eq!(parsed.remote.request_timeout_secs, Some(15));
        assert_eq!(parsed.logging.level, "debug");
    }
}
