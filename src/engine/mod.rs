//! # Resumable Batch Engine
//!
//! Drives records through a [`SentimentBackend`] in fixed-size batches and
//! appends one [`ResultRow`] per record to a JSONL log.
//!
//! ## Resume
//!
//! The log is the only state. Each run rebuilds the [`ProcessedSet`] from it,
//! skips every record whose id is already present, and works through the
//! rest. A batch whose backend call fails is reported and skipped; because
//! none of its rows reach the log, the next run picks it up again. Documents
//! the backend rejects individually are written as error outcomes and are
//! never retried.
//!
//! One engine per log file: nothing stops two concurrent runs from writing
//! the same id twice.
//!
//! ```rust,no_run
//! use sentiment_batch::backend::AzureLanguageBackend;
//! use sentiment_batch::config::ConfigManager;
//! use sentiment_batch::engine::BatchEngine;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigManager::load(None)?.into_config();
//! let backend = AzureLanguageBackend::new(&config.backend.credentials()?, &config.backend)?;
//! let records = sentiment_batch::dataset::load_from_config(&config.dataset)?;
//!
//! let engine = BatchEngine::new(backend, config.engine.clone());
//! let summary = engine
//!     .run(&records, config.engine.batch_size, &config.engine.output_path)
//!     .await?;
//! println!("wrote {} rows", summary.rows_written);
//! # Ok(())
//! # }
//! ```

pub mod prepare;
pub mod processed;
pub mod report;
pub mod result_log;

use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, instrument, Span};
use uuid::Uuid;

use crate::backend::{BackendError, SentimentBackend};
use crate::config::EngineConfig;
use crate::error::{Result, SentimentError};
use crate::models::{Record, ResultRow};

pub use prepare::{prepare_run, PreparedRun};
pub use processed::ProcessedSet;
pub use report::{BatchObserver, BatchReport, RunSummary, TracingObserver};
pub use result_log::ResultLog;

/// Resumable batch runner over a single results log
#[derive(Debug)]
pub struct BatchEngine<B> {
    backend: B,
    config: EngineConfig,
}

impl<B: SentimentBackend> BatchEngine<B> {
    pub fn new(backend: B, config: EngineConfig) -> Self {
        Self { backend, config }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Process every record not yet in `log_path`, logging batch outcomes via tracing
    pub async fn run(
        &self,
        records: &[Record],
        batch_size: usize,
        log_path: &Path,
    ) -> Result<RunSummary> {
        self.run_with_observer(records, batch_size, log_path, &mut TracingObserver)
            .await
    }

    /// Like [`BatchEngine::run`], handing each [`BatchReport`] to `observer`
    #[instrument(
        skip(self, records, observer),
        fields(
            run_id = tracing::field::Empty,
            backend = self.backend.name(),
            log_path = %log_path.display()
        )
    )]
    pub async fn run_with_observer<O>(
        &self,
        records: &[Record],
        batch_size: usize,
        log_path: &Path,
        observer: &mut O,
    ) -> Result<RunSummary>
    where
        O: BatchObserver + ?Sized,
    {
        self.validate_batch_size(batch_size)?;

        let run_id = Uuid::new_v4();
        Span::current().record("run_id", tracing::field::display(run_id));

        let processed = ProcessedSet::load(log_path)?;
        let remaining = pending_records(records, &processed);

        let mut summary = RunSummary::new(run_id, records.len(), processed.len(), remaining.len());
        summary.batches_total = remaining.len().div_ceil(batch_size);
        info!(
            loaded = summary.loaded,
            already_processed = summary.already_processed,
            remaining = summary.remaining,
            skipped_log_lines = processed.malformed_lines(),
            "Resume state reconstructed"
        );
        observer.on_start(&summary);

        if remaining.is_empty() {
            info!("Nothing left to process");
            return Ok(summary);
        }

        let mut log = ResultLog::open(log_path)?;

        for (index, batch) in remaining.chunks(batch_size).enumerate() {
            let ids: Vec<u64> = batch.iter().map(|r| r.id).collect();
            let texts: Vec<String> = batch.iter().map(|r| r.text.clone()).collect();
            debug!(
                batch_index = index,
                batch_len = batch.len(),
                batches_total = summary.batches_total,
                "Submitting batch"
            );

            let outcomes = match self.backend.classify(&texts, &self.config.language).await {
                Ok(outcomes) if outcomes.len() == batch.len() => outcomes,
                Ok(outcomes) => {
                    let cause = BackendError::OutcomeCountMismatch {
                        expected: batch.len(),
                        actual: outcomes.len(),
                    };
                    self.report(&mut summary, observer, BatchReport::Failed { index, ids, cause });
                    continue;
                }
                Err(cause) => {
                    self.report(&mut summary, observer, BatchReport::Failed { index, ids, cause });
                    continue;
                }
            };

            let mut document_errors = 0;
            for (record, outcome) in batch.iter().zip(outcomes) {
                if outcome.is_error() {
                    document_errors += 1;
                }
                log.append(&ResultRow::from_record(record, outcome))?;
            }
            if self.config.sync_after_batch {
                log.sync()?;
            }

            let report = BatchReport::Completed {
                index,
                rows_written: ids.len(),
                ids,
                document_errors,
            };
            self.report(&mut summary, observer, report);
        }

        info!(
            batches_completed = summary.batches_completed,
            batches_failed = summary.batches_failed,
            rows_written = summary.rows_written,
            document_errors = summary.document_errors,
            log_rows_appended = log.rows_written(),
            "Run finished"
        );

        Ok(summary)
    }

    fn report<O>(&self, summary: &mut RunSummary, observer: &mut O, report: BatchReport)
    where
        O: BatchObserver + ?Sized,
    {
        summary.record(&report);
        observer.on_batch(&report);
    }

    fn validate_batch_size(&self, batch_size: usize) -> Result<()> {
        if batch_size == 0 {
            return Err(SentimentError::validation_error(
                "batch size must be greater than 0",
            ));
        }
        if let Some(max) = self.backend.max_batch_size() {
            if batch_size > max {
                return Err(SentimentError::validation_error(format!(
                    "batch size {batch_size} exceeds the {} backend limit of {max}",
                    self.backend.name()
                )));
            }
        }
        Ok(())
    }
}

/// Records whose id is not yet processed, first occurrence only, in input order
fn pending_records<'a>(records: &'a [Record], processed: &ProcessedSet) -> Vec<&'a Record> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|r| !processed.contains(r.id) && seen.insert(r.id))
        .collect()
}
