//! Error types for the cache synchronization core.

use thiserror::Error;

/// Synchronization errors
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        SyncError::NetworkFailure(err.to_string())
    }
}

impl From<config::ConfigError> for SyncError {
    fn from(err: config::ConfigError) -> Self {
        SyncError::ConfigError(err.to_string())
    }
}
