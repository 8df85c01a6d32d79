//! Configuration Loader
//!
//! Resolves [`SentimentConfig`] from defaults, an optional TOML file and the
//! process environment, then validates it.

use config::{Config, Environment, File, FileFormat};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::SentimentConfig;
use crate::error::Result;

const DEFAULT_CONFIG_FILE: &str = "sentiment.toml";
const ENV_PREFIX: &str = "SENTIMENT";
const LEGACY_ENDPOINT_VAR: &str = "AZURE_LANGUAGE_ENDPOINT";
const LEGACY_KEY_VAR: &str = "AZURE_LANGUAGE_KEY";

/// Loaded configuration plus where it came from
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: SentimentConfig,
    source: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration, reading `.env` first
    ///
    /// An explicit `path` must exist; without one, `sentiment.toml` in the
    /// working directory is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Ok(dotenv_path) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", dotenv_path.display());
        }
        Self::load_without_dotenv(path)
    }

    /// Load configuration from the file and current process environment only
    pub fn load_without_dotenv(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&SentimentConfig::default())?);

        let source = match path {
            Some(path) => {
                builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
                Some(path.to_path_buf())
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    builder = builder
                        .add_source(File::from(default_path.as_path()).format(FileFormat::Toml));
                    Some(default_path)
                } else {
                    None
                }
            }
        };

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let mut config: SentimentConfig = builder.build()?.try_deserialize()?;
        Self::apply_credential_fallbacks(&mut config);
        config.validate()?;

        let manager = Self { config, source };

        debug!(
            "Configuration loaded: {}",
            serde_json::to_string(&manager.debug_config())
                .unwrap_or_else(|_| "[serialization error]".to_string())
        );
        info!(
            source = %manager
                .source
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "defaults+environment".to_string()),
            batch_size = manager.config.engine.batch_size,
            output_path = %manager.config.engine.output_path.display(),
            "Configuration loaded successfully"
        );

        Ok(manager)
    }

    /// Wrap an already-built configuration, validating it
    pub fn from_config(config: SentimentConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            source: None,
        })
    }

    pub fn config(&self) -> &SentimentConfig {
        &self.config
    }

    pub fn into_config(self) -> SentimentConfig {
        self.config
    }

    /// File the configuration was read from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// JSON view of the configuration with secrets masked
    pub fn debug_config(&self) -> serde_json::Value {
        let mut value = serde_json::json!(self.config);
        sanitize_json_recursive(&mut value, &["key", "secret", "token", "password"]);
        value
    }

    fn apply_credential_fallbacks(config: &mut SentimentConfig) {
        if config.backend.endpoint.is_none() {
            if let Ok(endpoint) = env::var(LEGACY_ENDPOINT_VAR) {
                config.backend.endpoint = Some(endpoint);
            }
        }
        if config.backend.api_key.is_none() {
            if let Ok(key) = env::var(LEGACY_KEY_VAR) {
                config.backend.api_key = Some(key);
            }
        }
    }
}

fn sanitize_json_recursive(value: &mut serde_json::Value, sensitive_patterns: &[&str]) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                let key_lower = key.to_lowercase();
                let is_sensitive = sensitive_patterns
                    .iter()
                    .any(|pattern| key_lower.contains(pattern));

                if is_sensitive {
                    if let serde_json::Value::String(s) = val {
                        let masked = if s.is_empty() {
                            "[EMPTY]".to_string()
                        } else if s.chars().count() > 4 {
                            let head: String = s.chars().take(2).collect();
                            let tail: String = s.chars().skip(s.chars().count() - 2).collect();
                            format!("[MASKED: {head}***{tail}]")
                        } else {
                            "[MASKED: ***]".to_string()
                        };
                        *val = serde_json::Value::String(masked);
                    } else if !val.is_null() {
                        *val = serde_json::Value::String("[MASKED]".to_string());
                    }
                } else {
                    sanitize_json_recursive(val, sensitive_patterns);
                }
            }
        }
        serde_json::Value::Array(items) => {
            for item in items.iter_mut() {
                sanitize_json_recursive(item, sensitive_patterns);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::MalformedLinePolicy;
    use crate::models::Sentiment;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn clear_env() {
        for var in [
            LEGACY_ENDPOINT_VAR,
            LEGACY_KEY_VAR,
            "SENTIMENT__BACKEND__ENDPOINT",
            "SENTIMENT__BACKEND__API_KEY",
            "SENTIMENT__ENGINE__BATCH_SIZE",
        ] {
            env::remove_var(var);
        }
    }

    fn create_test_config_toml() -> &'static str {
        r#"
[backend]
endpoint = "https://file.cognitiveservices.azure.com"
api_key = "file-key-1234"
timeout_ms = 10000

[dataset]
path = "fixtures/reviews.csv"
max_rows = 500
seed = 7

[engine]
batch_size = 5
output_path = "out/results.jsonl"

[evaluation]
malformed_lines = "fail"

[evaluation.label_policy]
mixed = "negative"
"#
    }

    #[test]
    #[serial]
    fn test_load_from_file() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sentiment.toml");
        fs::write(&path, create_test_config_toml()).unwrap();

        let manager = ConfigManager::load_without_dotenv(Some(&path)).unwrap();
        let config = manager.config();

        assert_eq!(manager.source(), Some(path.as_path()));
        assert_eq!(config.engine.batch_size, 5);
        assert_eq!(config.dataset.max_rows, Some(500));
        assert_eq!(config.dataset.seed, 7);
        assert_eq!(config.backend.timeout_ms, 10000);
        // Unset keys keep their defaults
        assert_eq!(config.backend.max_document_chars, 5000);
        assert_eq!(config.engine.language, "en");
        assert_eq!(config.evaluation.malformed_lines, MalformedLinePolicy::Fail);
        assert_eq!(
            config.evaluation.label_policy.map(Sentiment::Mixed),
            "negative"
        );
        assert_eq!(
            config.evaluation.label_policy.map(Sentiment::Neutral),
            "neutral"
        );
    }

    #[test]
    #[serial]
    fn test_environment_overrides_file() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sentiment.toml");
        fs::write(&path, create_test_config_toml()).unwrap();

        env::set_var("SENTIMENT__ENGINE__BATCH_SIZE", "3");
        env::set_var("SENTIMENT__BACKEND__ENDPOINT", "https://env.cognitiveservices.azure.com");
        let manager = ConfigManager::load_without_dotenv(Some(&path)).unwrap();
        clear_env();

        assert_eq!(manager.config().engine.batch_size, 3);
        assert_eq!(
            manager.config().backend.endpoint.as_deref(),
            Some("https://env.cognitiveservices.azure.com")
        );
    }

    #[test]
    #[serial]
    fn test_legacy_credential_variables_fill_gaps() {
        clear_env();
        env::set_var(LEGACY_ENDPOINT_VAR, "https://legacy.cognitiveservices.azure.com");
        env::set_var(LEGACY_KEY_VAR, "legacy-key");

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.toml");
        fs::write(&path, "").unwrap();
        let manager = ConfigManager::load_without_dotenv(Some(&path)).unwrap();
        clear_env();

        let credentials = manager.config().backend.credentials().unwrap();
        assert_eq!(credentials.endpoint, "https://legacy.cognitiveservices.azure.com");
        assert_eq!(credentials.api_key, "legacy-key");
    }

    #[test]
    #[serial]
    fn test_missing_explicit_file_is_an_error() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.toml");
        assert!(ConfigManager::load_without_dotenv(Some(&path)).is_err());
    }

    #[test]
    #[serial]
    fn test_invalid_values_fail_validation() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sentiment.toml");
        fs::write(&path, "[engine]\nbatch_size = 0\n").unwrap();
        assert!(ConfigManager::load_without_dotenv(Some(&path)).is_err());
    }

    #[test]
    fn test_debug_config_masks_api_key() {
        let mut config = SentimentConfig::default();
        config.backend.api_key = Some("abcdef123456".to_string());
        let manager = ConfigManager::from_config(config).unwrap();

        let rendered = manager.debug_config().to_string();
        assert!(!rendered.contains("abcdef123456"));
        assert!(rendered.contains("[MASKED: ab***56]"));
    }
}
