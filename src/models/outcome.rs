//! # Analysis Outcomes
//!
//! Per-document results returned by a sentiment backend and persisted inside
//! each result row. On the wire an outcome is a flat object discriminated by an
//! `error` flag:
//!
//! ```json
//! {"error": false, "sentiment": "positive", "confidence_scores": {"positive": 0.97, "neutral": 0.02, "negative": 0.01}}
//! {"error": true, "code": "InvalidDocument", "message": "Document text is empty."}
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::SentimentError;

/// Sentiment categories reported by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
    Mixed,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
            Sentiment::Mixed => "mixed",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = SentimentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "neutral" => Ok(Sentiment::Neutral),
            "negative" => Ok(Sentiment::Negative),
            "mixed" => Ok(Sentiment::Mixed),
            other => Err(SentimentError::validation_error(format!(
                "Unknown sentiment category: '{other}'"
            ))),
        }
    }
}

impl Serialize for Sentiment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Sentiment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Probability per scored category, each in `[0, 1]`
///
/// The service scores only positive, neutral and negative; `mixed` is a
/// document-level verdict without a score of its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceScores {
    #[serde(default)]
    pub positive: f64,
    #[serde(default)]
    pub neutral: f64,
    #[serde(default)]
    pub negative: f64,
}

impl ConfidenceScores {
    pub fn new(positive: f64, neutral: f64, negative: f64) -> Self {
        Self {
            positive,
            neutral,
            negative,
        }
    }

    pub fn get(&self, sentiment: Sentiment) -> Option<f64> {
        match sentiment {
            Sentiment::Positive => Some(self.positive),
            Sentiment::Neutral => Some(self.neutral),
            Sentiment::Negative => Some(self.negative),
            Sentiment::Mixed => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        [self.positive, self.neutral, self.negative]
            .iter()
            .all(|p| (0.0..=1.0).contains(p))
    }
}

/// Result of analysing a single document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "OutcomeRecord", into = "OutcomeRecord")]
pub enum AnalysisOutcome {
    Success {
        sentiment: Sentiment,
        confidence_scores: ConfidenceScores,
    },
    Error {
        code: String,
        message: String,
    },
}

impl AnalysisOutcome {
    pub fn success(sentiment: Sentiment, confidence_scores: ConfidenceScores) -> Self {
        Self::Success {
            sentiment,
            confidence_scores,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, AnalysisOutcome::Error { .. })
    }

    pub fn sentiment(&self) -> Option<Sentiment> {
        match self {
            AnalysisOutcome::Success { sentiment, .. } => Some(*sentiment),
            AnalysisOutcome::Error { .. } => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct OutcomeRecord {
    #[serde(default)]
    error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sentiment: Option<Sentiment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    confidence_scores: Option<ConfidenceScores>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl TryFrom<OutcomeRecord> for AnalysisOutcome {
    type Error = String;

    fn try_from(record: OutcomeRecord) -> Result<Self, String> {
        if record.error {
            return Ok(AnalysisOutcome::Error {
                code: record.code.unwrap_or_default(),
                message: record.message.unwrap_or_default(),
            });
        }

        let sentiment = record
            .sentiment
            .ok_or_else(|| "successful outcome is missing 'sentiment'".to_string())?;

        Ok(AnalysisOutcome::Success {
            sentiment,
            confidence_scores: record.confidence_scores.unwrap_or_default(),
        })
    }
}

impl From<AnalysisOutcome> for OutcomeRecord {
    fn from(outcome: AnalysisOutcome) -> Self {
        match outcome {
            AnalysisOutcome::Success {
                sentiment,
                confidence_scores,
            } => OutcomeRecord {
                error: false,
                sentiment: Some(sentiment),
                confidence_scores: Some(confidence_scores),
                code: None,
                message: None,
            },
            AnalysisOutcome::Error { code, message } => OutcomeRecord {
                error: true,
                sentiment: None,
                confidence_scores: None,
                code: Some(code),
                message: Some(message),
            },
        }
    }
}
