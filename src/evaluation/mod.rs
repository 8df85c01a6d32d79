//! # Evaluation
//!
//! Offline consumer of the results log. Error outcomes are dropped, service
//! sentiments are collapsed through a [`LabelPolicy`], and the predictions are
//! scored against the ground-truth labels carried in each row.
//!
//! Malformed lines follow [`MalformedLinePolicy`]: skipped and counted by
//! default, or fatal under `Fail`. The policy applies to every line of the
//! file, including a truncated final line.

pub mod metrics;
pub mod policy;

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::EvaluationConfig;
use crate::error::{Result, SentimentError};
use crate::models::ResultRow;

pub use metrics::{AverageMetrics, ClassificationReport, ConfusionMatrix, LabelMetrics};
pub use policy::{EvalLabel, LabelPolicy, MalformedLinePolicy};

/// Everything the evaluator derives from one results log
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub log_path: Option<PathBuf>,
    pub rows_loaded: usize,
    pub malformed_lines: usize,
    pub error_rows: usize,
    pub evaluated_rows: usize,
    /// Rows whose ground-truth label is not an evaluation label
    pub unscored_rows: usize,
    pub label_policy: LabelPolicy,
    pub truth_distribution: BTreeMap<String, u64>,
    pub predicted_distribution: BTreeMap<String, u64>,
    pub confusion_matrix: ConfusionMatrix,
    pub classification: ClassificationReport,
}

/// Read a results log and score it
pub fn evaluate_log(path: &Path, config: &EvaluationConfig) -> Result<EvaluationReport> {
    info!(log_path = %path.display(), "Loading results for evaluation");

    let (rows, malformed_lines) = read_result_rows(path, config.malformed_lines)?;
    let mut report = evaluate_rows(rows, &config.label_policy);
    report.malformed_lines = malformed_lines;
    report.log_path = Some(path.to_path_buf());

    info!(
        rows_loaded = report.rows_loaded,
        malformed_lines = report.malformed_lines,
        error_rows = report.error_rows,
        evaluated_rows = report.evaluated_rows,
        accuracy = report.classification.accuracy,
        "Evaluation complete"
    );

    Ok(report)
}

/// Parse every row of the log, applying the malformed-line policy
///
/// Returns the parsed rows and the number of lines that were skipped.
pub fn read_result_rows(
    path: &Path,
    policy: MalformedLinePolicy,
) -> Result<(Vec<ResultRow>, usize)> {
    let reader = BufReader::new(File::open(path)?);
    let mut rows = Vec::new();
    let mut malformed = 0;

    // Split on raw bytes so a line that is not UTF-8 is malformed, not an I/O error
    for (index, line) in reader.split(b'\n').enumerate() {
        let line = line?;
        let line_number = index + 1;
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        match serde_json::from_slice::<ResultRow>(&line) {
            Ok(row) => rows.push(row),
            Err(e) => match policy {
                MalformedLinePolicy::Skip => {
                    debug!(line = line_number, error = %e, "Skipping malformed result line");
                    malformed += 1;
                }
                MalformedLinePolicy::Fail => {
                    return Err(SentimentError::MalformedLog {
                        line: line_number,
                        reason: e.to_string(),
                    });
                }
            },
        }
    }

    if malformed > 0 {
        warn!(
            log_path = %path.display(),
            malformed_lines = malformed,
            "Skipped malformed lines while loading results"
        );
    }

    Ok((rows, malformed))
}

/// Score already-parsed rows
pub fn evaluate_rows(
    rows: impl IntoIterator<Item = ResultRow>,
    policy: &LabelPolicy,
) -> EvaluationReport {
    let mut rows_loaded = 0;
    let mut error_rows = 0;
    let mut evaluated_rows = 0;
    let mut unscored_rows = 0;
    let mut truth_distribution = BTreeMap::new();
    let mut predicted_distribution = BTreeMap::new();
    let mut confusion_matrix = ConfusionMatrix::new();

    for row in rows {
        rows_loaded += 1;

        let Some(sentiment) = row.result.sentiment() else {
            error_rows += 1;
            continue;
        };
        evaluated_rows += 1;

        let truth = row.label.trim().to_lowercase();
        let predicted = policy.label_for(sentiment);

        *predicted_distribution
            .entry(predicted.as_str().to_string())
            .or_insert(0) += 1;

        match truth.parse::<EvalLabel>() {
            Ok(truth_label) => confusion_matrix.record(truth_label, predicted),
            Err(_) => unscored_rows += 1,
        }
        *truth_distribution.entry(truth).or_insert(0) += 1;
    }

    let classification = ClassificationReport::from_matrix(&confusion_matrix);

    EvaluationReport {
        log_path: None,
        rows_loaded,
        malformed_lines: 0,
        error_rows,
        evaluated_rows,
        unscored_rows,
        label_policy: *policy,
        truth_distribution,
        predicted_distribution,
        confusion_matrix,
        classification,
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = &self.log_path {
            writeln!(f, "Results log: {}", path.display())?;
        }
        writeln!(
            f,
            "Loaded {} rows ({} malformed lines skipped)",
            self.rows_loaded, self.malformed_lines
        )?;
        writeln!(f, "After dropping error rows: {} rows", self.evaluated_rows)?;
        if self.unscored_rows > 0 {
            writeln!(
                f,
                "Rows with a ground-truth label outside the evaluation labels: {}",
                self.unscored_rows
            )?;
        }
        writeln!(
            f,
            "Label policy: neutral -> {}, mixed -> {}",
            self.label_policy.neutral, self.label_policy.mixed
        )?;

        writeln!(f, "\nLabel distribution (ground truth):")?;
        for (label, count) in &self.truth_distribution {
            writeln!(f, "  {label:<10} {count:>8}")?;
        }

        writeln!(f, "\nLabel distribution (predicted):")?;
        for (label, count) in &self.predicted_distribution {
            writeln!(f, "  {label:<10} {count:>8}")?;
        }

        let labels = self.confusion_matrix.labels();
        writeln!(f, "\nConfusion matrix (rows: truth, columns: prediction):")?;
        write!(f, "{:>12}", "")?;
        for label in labels {
            write!(f, "{:>10}", label.as_str())?;
        }
        writeln!(f)?;
        for (label, row) in labels.iter().zip(self.confusion_matrix.rows()) {
            write!(f, "{:>12}", label.as_str())?;
            for count in row {
                write!(f, "{count:>10}")?;
            }
            writeln!(f)?;
        }

        writeln!(f, "\nClassification report:")?;
        writeln!(
            f,
            "{:>12}{:>11}{:>10}{:>10}{:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for metrics in &self.classification.labels {
            writeln!(
                f,
                "{:>12}{:>11.2}{:>10.2}{:>10.2}{:>10}",
                metrics.label.as_str(),
                metrics.precision,
                metrics.recall,
                metrics.f1_score,
                metrics.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>12}{:>11}{:>10}{:>10.2}{:>10}",
            "accuracy", "", "", self.classification.accuracy, self.classification.macro_avg.support
        )?;
        for (name, avg) in [
            ("macro avg", &self.classification.macro_avg),
            ("weighted avg", &self.classification.weighted_avg),
        ] {
            writeln!(
                f,
                "{:>12}{:>11.2}{:>10.2}{:>10.2}{:>10}",
                name, avg.precision, avg.recall, avg.f1_score, avg.support
            )?;
        }
        Ok(())
    }
}
