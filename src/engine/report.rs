use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::backend::BackendError;
use crate::logging::log_batch_operation;

/// What happened to one batch
#[derive(Debug)]
pub enum BatchReport {
    /// Backend answered; every row of the batch is in the log
    Completed {
        index: usize,
        ids: Vec<u64>,
        rows_written: usize,
        document_errors: usize,
    },
    /// Whole call failed; none of `ids` were written and they stay pending
    Failed {
        index: usize,
        ids: Vec<u64>,
        cause: BackendError,
    },
}

impl BatchReport {
    pub fn index(&self) -> usize {
        match self {
            BatchReport::Completed { index, .. } | BatchReport::Failed { index, .. } => *index,
        }
    }

    pub fn ids(&self) -> &[u64] {
        match self {
            BatchReport::Completed { ids, .. } | BatchReport::Failed { ids, .. } => ids,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, BatchReport::Failed { .. })
    }
}

/// Receives a [`BatchReport`] after every batch
pub trait BatchObserver {
    /// Called once the remaining set is known, before any batch is submitted
    fn on_start(&mut self, _summary: &RunSummary) {}

    fn on_batch(&mut self, report: &BatchReport);
}

impl<F> BatchObserver for F
where
    F: FnMut(&BatchReport),
{
    fn on_batch(&mut self, report: &BatchReport) {
        self(report)
    }
}

/// Default observer: completed batches at info, failed batches at warn
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl BatchObserver for TracingObserver {
    fn on_batch(&mut self, report: &BatchReport) {
        match report {
            BatchReport::Completed {
                index,
                ids,
                document_errors,
                ..
            } => {
                let details = (*document_errors > 0)
                    .then(|| format!("{document_errors} document-level errors recorded"));
                log_batch_operation("classify", *index, ids.len(), "completed", details.as_deref());
            }
            BatchReport::Failed { index, ids, cause } => {
                warn!(
                    batch_index = index,
                    first_id = ids.first().copied(),
                    batch_len = ids.len(),
                    recoverable = cause.is_recoverable(),
                    error = %cause,
                    "Batch {} failed; its records will be retried on the next run",
                    index
                );
            }
        }
    }
}

/// Totals for one engine run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    /// Records handed to the engine
    pub loaded: usize,
    /// Distinct ids already present in the log at start
    pub already_processed: usize,
    /// Records left after filtering against the log
    pub remaining: usize,
    pub batches_total: usize,
    pub batches_completed: usize,
    pub batches_failed: usize,
    pub rows_written: usize,
    pub document_errors: usize,
}

impl RunSummary {
    pub fn new(run_id: Uuid, loaded: usize, already_processed: usize, remaining: usize) -> Self {
        Self {
            run_id,
            loaded,
            already_processed,
            remaining,
            batches_total: 0,
            batches_completed: 0,
            batches_failed: 0,
            rows_written: 0,
            document_errors: 0,
        }
    }

    /// Every remaining record made it into the log
    pub fn is_complete(&self) -> bool {
        self.batches_failed == 0 && self.rows_written == self.remaining
    }

    /// Nothing was left to do when the run started
    pub fn was_noop(&self) -> bool {
        self.remaining == 0
    }

    pub(crate) fn record(&mut self, report: &BatchReport) {
        match report {
            BatchReport::Completed {
                rows_written,
                document_errors,
                ..
            } => {
                self.batches_completed += 1;
                self.rows_written += rows_written;
                self.document_errors += document_errors;
            }
            BatchReport::Failed { .. } => self.batches_failed += 1,
        }
    }
}
