//! # Structured Logging Module
//!
//! Environment-aware structured logging. Console output is always on; when
//! `SENTIMENT_LOG_DIR` is set, a JSON copy of every event is also written to
//! `<dir>/<environment>.<pid>.<timestamp>.log`.
//!
//! `RUST_LOG` overrides the environment-derived level.

use chrono::Utc;
use std::path::PathBuf;
use std::process;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration
///
/// `verbosity` raises the level above the environment default (1 = info,
/// 2 = debug, 3+ = trace). Safe to call more than once.
pub fn init_structured_logging(verbosity: u8) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = get_log_level(&environment, verbosity);
        let filter = || {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level))
        };

        let console_layer = fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_writer(std::io::stderr)
            .with_filter(filter());

        let (file_layer, guard, log_path) = match std::env::var("SENTIMENT_LOG_DIR") {
            Ok(dir) => {
                let log_dir = PathBuf::from(dir);
                let timestamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
                let log_filename = format!("{}.{}.{}.log", environment, process::id(), timestamp);
                let file_appender = tracing_appender::rolling::never(&log_dir, &log_filename);
                let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
                let layer = fmt::layer()
                    .with_writer(file_writer)
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(false)
                    .json()
                    .with_filter(filter());
                (Some(layer), Some(guard), Some(log_dir.join(log_filename)))
            }
            Err(_) => (None, None, None),
        };

        // A subscriber may already be installed (tests, embedding applications)
        if tracing_subscriber::registry()
            .with(console_layer)
            .with(file_layer)
            .try_init()
            .is_err()
        {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::debug!(
            pid = process::id(),
            environment = %environment,
            log_level = %log_level,
            log_file = ?log_path,
            "Structured logging initialized"
        );

        // The file writer stops flushing once its guard drops
        if let Some(guard) = guard {
            std::mem::forget(guard);
        }
    });
}

/// Get current environment from environment variables
fn get_environment() -> String {
    std::env::var("SENTIMENT_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
        .to_lowercase()
}

/// Get log level based on environment and requested verbosity
fn get_log_level(environment: &str, verbosity: u8) -> String {
    let base = match environment {
        "test" | "development" => "info",
        "production" => "warn",
        _ => "info",
    };
    match verbosity {
        0 => base.to_string(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Log structured data for batch operations
pub fn log_batch_operation(
    operation: &str,
    batch_index: usize,
    batch_len: usize,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        batch_index = batch_index,
        batch_len = batch_len,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "BATCH_OPERATION"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "ERROR"
    );
}
