//! Error types for the sentiment batch system.
//!

use std::path::PathBuf;
use thiserror::Error;

use crate::backend::BackendError;

#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("Dataset not found: {path}")]
    DatasetNotFound { path: PathBuf },
    #[error("Schema error: {path} is missing required column(s) {missing:?}")]
    Schema { path: PathBuf, missing: Vec<String> },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
    #[error("Malformed log line {line}: {reason}")]
    MalformedLog { line: usize, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SentimentError {
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigurationError(message.into())
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// Errors that abort a run before any state is written.
    #[must_use]
    pub fn is_startup_error(&self) -> bool {
        matches!(
            self,
            SentimentError::DatasetNotFound { .. }
                | SentimentError::Schema { .. }
                | SentimentError::Csv(_)
                | SentimentError::ConfigurationError(_)
                | SentimentError::ValidationError(_)
        )
    }
}

impl From<config::ConfigError> for SentimentError {
    fn from(error: config::ConfigError) -> Self {
        SentimentError::ConfigurationError(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SentimentError>;
