use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::SentimentError;
use crate::models::Sentiment;

/// Labels the evaluation is scored over, in report order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EvalLabel {
    Negative,
    Neutral,
    Positive,
}

impl EvalLabel {
    pub const ALL: [EvalLabel; 3] = [EvalLabel::Negative, EvalLabel::Neutral, EvalLabel::Positive];

    pub fn as_str(&self) -> &'static str {
        match self {
            EvalLabel::Negative => "negative",
            EvalLabel::Neutral => "neutral",
            EvalLabel::Positive => "positive",
        }
    }

    /// Position of the label in [`EvalLabel::ALL`]
    pub fn index(&self) -> usize {
        match self {
            EvalLabel::Negative => 0,
            EvalLabel::Neutral => 1,
            EvalLabel::Positive => 2,
        }
    }
}

impl fmt::Display for EvalLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EvalLabel {
    type Err = SentimentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "negative" => Ok(EvalLabel::Negative),
            "neutral" => Ok(EvalLabel::Neutral),
            "positive" => Ok(EvalLabel::Positive),
            other => Err(SentimentError::validation_error(format!(
                "Unknown evaluation label: '{other}' (expected negative, neutral or positive)"
            ))),
        }
    }
}

impl Serialize for EvalLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EvalLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// How service sentiment categories collapse onto evaluation labels
///
/// Positive and negative always map to themselves. Ground truth is binary, so
/// wherever neutral and mixed land materially changes the reported accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelPolicy {
    pub neutral: EvalLabel,
    pub mixed: EvalLabel,
}

impl Default for LabelPolicy {
    fn default() -> Self {
        Self {
            neutral: EvalLabel::Neutral,
            mixed: EvalLabel::Neutral,
        }
    }
}

impl LabelPolicy {
    pub fn label_for(&self, sentiment: Sentiment) -> EvalLabel {
        match sentiment {
            Sentiment::Positive => EvalLabel::Positive,
            Sentiment::Negative => EvalLabel::Negative,
            Sentiment::Neutral => self.neutral,
            Sentiment::Mixed => self.mixed,
        }
    }

    pub fn map(&self, sentiment: Sentiment) -> &'static str {
        self.label_for(sentiment).as_str()
    }
}

/// What the evaluator does with a log line that does not parse as a result row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedLinePolicy {
    /// Skip the line and count it in the report
    #[default]
    Skip,
    /// Abort evaluation at the first malformed line
    Fail,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_folds_mixed_into_neutral() {
        let policy = LabelPolicy::default();
        assert_eq!(policy.label_for(Sentiment::Positive), EvalLabel::Positive);
        assert_eq!(policy.label_for(Sentiment::Negative), EvalLabel::Negative);
        assert_eq!(policy.label_for(Sentiment::Neutral), EvalLabel::Neutral);
        assert_eq!(policy.label_for(Sentiment::Mixed), EvalLabel::Neutral);
    }

    #[test]
    fn test_custom_policy() {
        let policy = LabelPolicy {
            neutral: EvalLabel::Negative,
            mixed: EvalLabel::Positive,
        };
        assert_eq!(policy.map(Sentiment::Neutral), "negative");
        assert_eq!(policy.map(Sentiment::Mixed), "positive");
    }

    #[test]
    fn test_label_parsing() {
        assert_eq!(" Positive".parse::<EvalLabel>().unwrap(), EvalLabel::Positive);
        assert!("mixed".parse::<EvalLabel>().is_err());
        assert_eq!(EvalLabel::ALL.map(|l| l.index()), [0, 1, 2]);
    }
}
