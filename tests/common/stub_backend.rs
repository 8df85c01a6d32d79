use async_trait::async_trait;
use sentiment_batch::{
    AnalysisOutcome, BackendError, BackendResult, ConfidenceScores, Sentiment, SentimentBackend,
};
use std::collections::HashSet;
use std::sync::Mutex;

/// Scripted backend for engine tests
///
/// Texts containing `bad` classify negative, `meh` neutral, `mixed` mixed and
/// `reject` come back as a document-level error; anything else is positive.
/// Whole calls can be failed by call number or by the texts they carry.
#[derive(Debug, Default)]
pub struct StubBackend {
    /// Every batch of texts received, in call order
    pub calls: Mutex<Vec<Vec<String>>>,
    /// Zero-based call numbers that fail as a whole
    pub fail_calls: HashSet<usize>,
    /// A batch carrying any of these texts fails as a whole
    pub fail_texts: HashSet<String>,
    /// Drop the last outcome of every response
    pub short_response: bool,
    pub limit: Option<usize>,
}

impl StubBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_calls(calls: impl IntoIterator<Item = usize>) -> Self {
        Self {
            fail_calls: calls.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn failing_texts<S: Into<String>>(texts: impl IntoIterator<Item = S>) -> Self {
        Self {
            fail_texts: texts.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn submitted_texts(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().flatten().cloned().collect()
    }

    pub fn outcome_for(text: &str) -> AnalysisOutcome {
        if text.contains("reject") {
            return AnalysisOutcome::error("InvalidDocument", "Document text is empty.");
        }
        let sentiment = if text.contains("bad") {
            Sentiment::Negative
        } else if text.contains("meh") {
            Sentiment::Neutral
        } else if text.contains("mixed") {
            Sentiment::Mixed
        } else {
            Sentiment::Positive
        };
        let scores = match sentiment {
            Sentiment::Positive => ConfidenceScores::new(0.9, 0.05, 0.05),
            Sentiment::Negative => ConfidenceScores::new(0.05, 0.05, 0.9),
            Sentiment::Neutral | Sentiment::Mixed => ConfidenceScores::new(0.2, 0.6, 0.2),
        };
        AnalysisOutcome::success(sentiment, scores)
    }
}

#[async_trait]
impl SentimentBackend for StubBackend {
    async fn classify(
        &self,
        texts: &[String],
        _language: &str,
    ) -> BackendResult<Vec<AnalysisOutcome>> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(texts.to_vec());
            calls.len() - 1
        };

        if self.fail_calls.contains(&call) || texts.iter().any(|t| self.fail_texts.contains(t)) {
            return Err(BackendError::api_error(503, "stub outage"));
        }

        let mut outcomes: Vec<AnalysisOutcome> =
            texts.iter().map(|t| Self::outcome_for(t)).collect();
        if self.short_response {
            outcomes.pop();
        }
        Ok(outcomes)
    }

    fn max_batch_size(&self) -> Option<usize> {
        self.limit
    }

    fn name(&self) -> &str {
        "stub"
    }
}
