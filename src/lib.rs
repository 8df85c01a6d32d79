#![allow(clippy::doc_markdown)] // Allow technical terms like JSONL, IMDB in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Sentiment Batch
//!
//! Resumable batch sentiment analysis of review datasets against a cloud
//! sentiment service, with offline evaluation of the collected results.
//!
//! ## Overview
//!
//! A labelled review CSV is loaded (optionally sampled), split into batches
//! and sent to the Azure AI Language sentiment endpoint. Every classified
//! review is appended to a JSONL results log as soon as its batch returns.
//! The log is the only checkpoint: rerunning the same job skips every id the
//! log already holds, so an interrupted or partly failed run is finished by
//! simply running it again.
//!
//! ## Module Organization
//!
//! - [`dataset`] - CSV loading and reproducible sampling
//! - [`backend`] - The [`SentimentBackend`] seam and the Azure client
//! - [`engine`] - Resume, batching and the append-only results log
//! - [`evaluation`] - Label mapping, confusion matrix and per-class metrics
//! - [`config`] - Layered TOML/environment configuration
//! - [`logging`] - Structured tracing setup
//! - [`models`] - Records, outcomes and log rows
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sentiment_batch::{AzureLanguageBackend, BatchEngine, ConfigManager};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigManager::load(None)?.into_config();
//! let credentials = config.backend.credentials()?;
//! let backend = AzureLanguageBackend::new(&credentials, &config.backend)?;
//!
//! let records = sentiment_batch::load_dataset(&config.dataset.path, Some(200), 42)?;
//! let summary = BatchEngine::new(backend, config.engine.clone())
//!     .run(&records, 10, &config.engine.output_path)
//!     .await?;
//!
//! let report = sentiment_batch::evaluate_log(&config.engine.output_path, &config.evaluation)?;
//! println!("{} new rows, accuracy {:.3}", summary.rows_written, report.classification.accuracy);
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # Unit and integration tests (stub backend, no network)
//! ```

pub mod backend;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod evaluation;
pub mod logging;
pub mod models;

pub use backend::{AzureLanguageBackend, BackendError, BackendResult, SentimentBackend};
pub use config::{ConfigManager, SentimentConfig};
pub use dataset::load_dataset;
pub use engine::{BatchEngine, BatchObserver, BatchReport, RunSummary, TracingObserver};
pub use error::{Result, SentimentError};
pub use evaluation::{evaluate_log, EvaluationReport, LabelPolicy, MalformedLinePolicy};
pub use models::{AnalysisOutcome, ConfidenceScores, Record, ResultRow, Sentiment};
