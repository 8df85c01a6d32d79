use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{AnalysisOutcome, Record};

/// ResultRow is one persisted line of the results log
/// Append-only: a row is never rewritten once it has been flushed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: u64,
    pub review: String,
    /// Ground-truth label carried through for evaluation
    pub label: String,
    #[serde(alias = "azure_result")]
    pub result: AnalysisOutcome,
}

impl ResultRow {
    pub fn from_record(record: &Record, result: AnalysisOutcome) -> Self {
        Self {
            id: record.id,
            review: record.text.clone(),
            label: record.label.clone(),
            result,
        }
    }

    /// Serialize as a single JSONL line (without the trailing newline)
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Accept integer ids, integral floats and integer strings
///
/// The resume scan and row parsing share this rule, so a row counted as
/// processed is always a row the evaluator can read.
pub(crate) fn id_from_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    id_from_value(&value).ok_or_else(|| {
        serde::de::Error::custom(format!("expected a non-negative integer id, got {value}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConfidenceScores, Sentiment};
    use serde_json::json;

    #[test]
    fn test_row_keeps_record_fields() {
        let record = Record::new(7, "great film", "positive");
        let row = ResultRow::from_record(
            &record,
            AnalysisOutcome::success(Sentiment::Positive, ConfidenceScores::new(0.9, 0.05, 0.05)),
        );

        let line = row.to_json_line().unwrap();
        assert!(!line.contains('\n'));

        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["review"], "great film");
        assert_eq!(value["label"], "positive");
        assert_eq!(value["result"]["sentiment"], "positive");
    }

    #[test]
    fn test_legacy_result_key_and_unknown_fields_are_accepted() {
        let line = r#"{"id": 3, "review": "meh", "label": "negative", "azure_result": {"error": true, "code": "X", "message": "y"}, "extra": 1}"#;
        let row: ResultRow = serde_json::from_str(line).unwrap();
        assert_eq!(row.id, 3);
        assert!(row.result.is_error());
    }

    #[test]
    fn test_id_rule_accepts_integral_forms_only() {
        assert_eq!(id_from_value(&json!(12)), Some(12));
        assert_eq!(id_from_value(&json!(3.0)), Some(3));
        assert_eq!(id_from_value(&json!(" 12 ")), Some(12));
        assert_eq!(id_from_value(&json!(-1)), None);
        assert_eq!(id_from_value(&json!(1.5)), None);
        assert_eq!(id_from_value(&json!(true)), None);
    }

    #[test]
    fn test_string_and_float_ids_parse_like_the_resume_scan() {
        let string_id: ResultRow = serde_json::from_value(json!({
            "id": "5", "review": "r", "label": "positive",
            "result": {"error": true, "code": "X", "message": "y"}
        }))
        .unwrap();
        assert_eq!(string_id.id, 5);

        let float_id: ResultRow = serde_json::from_value(json!({
            "id": 6.0, "review": "r", "label": "positive",
            "result": {"error": true, "code": "X", "message": "y"}
        }))
        .unwrap();
        assert_eq!(float_id.id, 6);

        let negative = serde_json::from_value::<ResultRow>(json!({
            "id": -2, "review": "r", "label": "positive",
            "result": {"error": true, "code": "X", "message": "y"}
        }));
        assert!(negative.is_err());
    }
}
