//! # Configuration
//!
//! Layered configuration for the batch runner and the evaluator. Values are
//! resolved, lowest precedence first, from:
//!
//! - built-in defaults (`SentimentConfig::default()`)
//! - an optional TOML file (`sentiment.toml` in the working directory, or an
//!   explicit `--config` path)
//! - `SENTIMENT__<SECTION>__<KEY>` environment variables
//! - the `AZURE_LANGUAGE_ENDPOINT` / `AZURE_LANGUAGE_KEY` credential variables,
//!   when the endpoint or key is still unset
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sentiment_batch::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load(None)?;
//! let credentials = manager.config().backend.credentials()?;
//! println!("Batch size: {}", manager.config().engine.batch_size);
//! # let _ = credentials;
//! # Ok(())
//! # }
//! ```

pub mod loader;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Result, SentimentError};
use crate::evaluation::{LabelPolicy, MalformedLinePolicy};

pub use loader::ConfigManager;

/// Root configuration structure mirroring `sentiment.toml`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SentimentConfig {
    /// Sentiment service connection settings
    pub backend: BackendConfig,

    /// Input dataset location and sampling
    pub dataset: DatasetConfig,

    /// Batch engine settings
    pub engine: EngineConfig,

    /// Offline evaluation settings
    pub evaluation: EvaluationConfig,
}

/// Azure AI Language connection settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Resource endpoint, e.g. `https://my-resource.cognitiveservices.azure.com`
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub api_version: String,
    /// Documents longer than this many characters are truncated before submission
    pub max_document_chars: usize,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            api_version: "2023-04-01".to_string(),
            max_document_chars: 5000,
            timeout_ms: 30000,
        }
    }
}

/// Resolved service credentials; both values are guaranteed non-empty
#[derive(Clone)]
pub struct BackendCredentials {
    pub endpoint: String,
    pub api_key: String,
}

impl std::fmt::Debug for BackendCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendCredentials")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[MASKED]")
            .finish()
    }
}

impl BackendConfig {
    /// Resolve the endpoint and key, failing when either is absent or blank
    pub fn credentials(&self) -> Result<BackendCredentials> {
        let endpoint = non_blank(self.endpoint.as_deref());
        let api_key = non_blank(self.api_key.as_deref());

        match (endpoint, api_key) {
            (Some(endpoint), Some(api_key)) => Ok(BackendCredentials {
                endpoint: endpoint.to_string(),
                api_key: api_key.to_string(),
            }),
            (endpoint, api_key) => {
                let mut missing = Vec::new();
                if endpoint.is_none() {
                    missing.push("backend.endpoint (AZURE_LANGUAGE_ENDPOINT)");
                }
                if api_key.is_none() {
                    missing.push("backend.api_key (AZURE_LANGUAGE_KEY)");
                }
                Err(SentimentError::config_error(format!(
                    "Missing sentiment service credentials: {}",
                    missing.join(", ")
                )))
            }
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Input dataset settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub path: PathBuf,
    /// Sample this many rows instead of the full dataset
    pub max_rows: Option<usize>,
    pub seed: u64,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/raw/imdb/IMDB_Dataset_CLEANED.csv"),
            max_rows: None,
            seed: 42,
        }
    }
}

/// Batch engine settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Documents per backend call
    pub batch_size: usize,
    /// Append-only JSONL results log
    pub output_path: PathBuf,
    /// Language hint passed to the backend with every batch
    pub language: String,
    /// fsync the log after each completed batch
    pub sync_after_batch: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            output_path: PathBuf::from("data/processed/imdb_language_results.jsonl"),
            language: "en".to_string(),
            sync_after_batch: true,
        }
    }
}

/// Offline evaluation settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EvaluationConfig {
    pub label_policy: LabelPolicy,
    pub malformed_lines: MalformedLinePolicy,
}

impl SentimentConfig {
    /// Validate values that would otherwise fail deep inside a run
    ///
    /// Credentials are not checked here; commands that talk to the service
    /// resolve them through [`BackendConfig::credentials`].
    pub fn validate(&self) -> Result<()> {
        if self.engine.batch_size == 0 {
            return Err(SentimentError::validation_error(
                "engine.batch_size must be greater than 0",
            ));
        }

        if self.engine.language.trim().is_empty() {
            return Err(SentimentError::validation_error(
                "engine.language must not be empty",
            ));
        }

        if self.backend.max_document_chars == 0 {
            return Err(SentimentError::validation_error(
                "backend.max_document_chars must be greater than 0",
            ));
        }

        if self.backend.timeout_ms == 0 {
            return Err(SentimentError::validation_error(
                "backend.timeout_ms must be greater than 0",
            ));
        }

        if self.backend.api_version.trim().is_empty() {
            return Err(SentimentError::validation_error(
                "backend.api_version must not be empty",
            ));
        }

        if self.dataset.max_rows == Some(0) {
            return Err(SentimentError::validation_error(
                "dataset.max_rows must be greater than 0 when set",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SentimentConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.engine.batch_size, 10);
        assert_eq!(config.dataset.seed, 42);
        assert_eq!(config.backend.max_document_chars, 5000);
        assert_eq!(config.engine.language, "en");
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let mut config = SentimentConfig::default();
        config.engine.batch_size = 0;
        assert!(matches!(
            config.validate(),
            Err(SentimentError::ValidationError(_))
        ));
    }

    #[test]
    fn test_missing_credentials_name_both_fields() {
        let backend = BackendConfig::default();
        let err = backend.credentials().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("backend.endpoint"));
        assert!(message.contains("backend.api_key"));
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let backend = BackendConfig {
            endpoint: Some("https://example.cognitiveservices.azure.com".to_string()),
            api_key: Some("   ".to_string()),
            ..BackendConfig::default()
        };
        let err = backend.credentials().unwrap_err();
        assert!(err.to_string().contains("backend.api_key"));
        assert!(!err.to_string().contains("backend.endpoint"));
    }

    #[test]
    fn test_credentials_debug_masks_key() {
        let credentials = BackendCredentials {
            endpoint: "https://example.cognitiveservices.azure.com".to_string(),
            api_key: "super-secret".to_string(),
        };
        let rendered = format!("{credentials:?}");
        assert!(!rendered.contains("super-secret"));
    }
}
