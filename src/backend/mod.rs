//! # Sentiment Backends
//!
//! The seam between the batch engine and whatever classifies the text. A
//! backend receives one batch of texts and returns exactly one
//! [`AnalysisOutcome`] per text, in submission order. Problems with a single
//! document are reported inline as [`AnalysisOutcome::Error`]; only a failure
//! of the whole call is returned as a [`BackendError`].

pub mod azure;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::models::AnalysisOutcome;

pub use azure::AzureLanguageBackend;

pub type BackendResult<T> = Result<T, BackendError>;

/// Whole-batch failures
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Backend returned {actual} outcomes for {expected} documents")]
    OutcomeCountMismatch { expected: usize, actual: usize },

    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl BackendError {
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn invalid_response(reason: impl Into<String>) -> Self {
        Self::InvalidResponse(reason.into())
    }

    /// Check if error is transient (likely to succeed on a later run)
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            BackendError::Http(e) => e.is_timeout() || e.is_connect(),
            BackendError::Api { status, .. } => *status == 429 || *status >= 500,
            BackendError::Unavailable(_) => true,
            BackendError::InvalidResponse(_) | BackendError::OutcomeCountMismatch { .. } => false,
        }
    }
}

/// Classifies batches of documents
#[async_trait]
pub trait SentimentBackend: Send + Sync {
    /// Classify `texts`, returning one outcome per text in the same order
    async fn classify(&self, texts: &[String], language: &str)
        -> BackendResult<Vec<AnalysisOutcome>>;

    /// Largest batch the backend accepts in one call, if it has a limit
    fn max_batch_size(&self) -> Option<usize> {
        None
    }

    fn name(&self) -> &str {
        "sentiment-backend"
    }
}

#[async_trait]
impl<T: SentimentBackend + ?Sized> SentimentBackend for Arc<T> {
    async fn classify(
        &self,
        texts: &[String],
        language: &str,
    ) -> BackendResult<Vec<AnalysisOutcome>> {
        (**self).classify(texts, language).await
    }

    fn max_batch_size(&self) -> Option<usize> {
        (**self).max_batch_size()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<T: SentimentBackend + ?Sized> SentimentBackend for Box<T> {
    async fn classify(
        &self,
        texts: &[String],
        language: &str,
    ) -> BackendResult<Vec<AnalysisOutcome>> {
        (**self).classify(texts, language).await
    }

    fn max_batch_size(&self) -> Option<usize> {
        (**self).max_batch_size()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(BackendError::api_error(503, "busy").is_recoverable());
        assert!(BackendError::api_error(429, "throttled").is_recoverable());
        assert!(!BackendError::api_error(401, "bad key").is_recoverable());
        assert!(!BackendError::invalid_response("missing id").is_recoverable());
        assert!(!BackendError::OutcomeCountMismatch {
            expected: 3,
            actual: 2
        }
        .is_recoverable());
    }
}
