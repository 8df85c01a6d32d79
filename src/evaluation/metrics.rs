//! Confusion matrix and per-label precision / recall / F1.
//!
//! Division by zero yields `0.0`, so labels that never occur (the neutral
//! ground-truth row, typically) report zeros rather than NaN.

use serde::Serialize;

use super::policy::EvalLabel;

const LABEL_COUNT: usize = EvalLabel::ALL.len();

/// Counts indexed `[truth][prediction]` over [`EvalLabel::ALL`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    labels: [EvalLabel; LABEL_COUNT],
    counts: [[u64; LABEL_COUNT]; LABEL_COUNT],
}

impl Default for ConfusionMatrix {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfusionMatrix {
    pub fn new() -> Self {
        Self {
            labels: EvalLabel::ALL,
            counts: [[0; LABEL_COUNT]; LABEL_COUNT],
        }
    }

    pub fn record(&mut self, truth: EvalLabel, predicted: EvalLabel) {
        self.counts[truth.index()][predicted.index()] += 1;
    }

    pub fn labels(&self) -> &[EvalLabel] {
        &self.labels
    }

    pub fn count(&self, truth: EvalLabel, predicted: EvalLabel) -> u64 {
        self.counts[truth.index()][predicted.index()]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    pub fn correct(&self) -> u64 {
        (0..LABEL_COUNT).map(|i| self.counts[i][i]).sum()
    }

    /// Number of samples whose ground truth is `label`
    pub fn support(&self, label: EvalLabel) -> u64 {
        self.counts[label.index()].iter().sum()
    }

    /// Number of samples predicted as `label`
    pub fn predicted(&self, label: EvalLabel) -> u64 {
        self.counts.iter().map(|row| row[label.index()]).sum()
    }

    pub fn rows(&self) -> &[[u64; LABEL_COUNT]; LABEL_COUNT] {
        &self.counts
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelMetrics {
    pub label: EvalLabel,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub labels: Vec<LabelMetrics>,
    pub accuracy: f64,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
}

impl ClassificationReport {
    pub fn from_matrix(matrix: &ConfusionMatrix) -> Self {
        let labels: Vec<LabelMetrics> = matrix
            .labels()
            .iter()
            .map(|&label| {
                let true_positives = matrix.count(label, label);
                let precision = ratio(true_positives, matrix.predicted(label));
                let recall = ratio(true_positives, matrix.support(label));
                LabelMetrics {
                    label,
                    precision,
                    recall,
                    f1_score: f1(precision, recall),
                    support: matrix.support(label),
                }
            })
            .collect();

        let total = matrix.total();
        let label_count = labels.len() as f64;

        let macro_avg = AverageMetrics {
            precision: labels.iter().map(|m| m.precision).sum::<f64>() / label_count,
            recall: labels.iter().map(|m| m.recall).sum::<f64>() / label_count,
            f1_score: labels.iter().map(|m| m.f1_score).sum::<f64>() / label_count,
            support: total,
        };

        let weighted = |metric: fn(&LabelMetrics) -> f64| -> f64 {
            if total == 0 {
                return 0.0;
            }
            labels
                .iter()
                .map(|m| metric(m) * m.support as f64)
                .sum::<f64>()
                / total as f64
        };

        let weighted_avg = AverageMetrics {
            precision: weighted(|m| m.precision),
            recall: weighted(|m| m.recall),
            f1_score: weighted(|m| m.f1_score),
            support: total,
        };

        Self {
            accuracy: ratio(matrix.correct(), total),
            labels,
            macro_avg,
            weighted_avg,
        }
    }

    pub fn for_label(&self, label: EvalLabel) -> Option<&LabelMetrics> {
        self.labels.iter().find(|m| m.label == label)
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}
