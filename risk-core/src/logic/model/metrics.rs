//! Evaluation metrics for the risk classifier.
//!
//! Computes confusion-matrix-derived metrics from predicted and ground-truth
//! labels. Class 0 = safe, class 1 = at risk.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::forest::ForestError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AveragedMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Per-class precision/recall/F1 plus averages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub accuracy: f64,
    pub safe: ClassMetrics,
    pub at_risk: ClassMetrics,
    pub macro_avg: AveragedMetrics,
    pub weighted_avg: AveragedMetrics,
    pub tp: usize,
    pub fp: usize,
    pub tn: usize,
    pub fn_count: usize,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den > 0 {
        num as f64 / den as f64
    } else {
        0.0
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    }
}

impl ClassificationReport {
    pub fn compute(predictions: &[u8], labels: &[u8]) -> Result<Self, ForestError> {
        if predictions.len() != labels.len() {
            return Err(ForestError::LabelMismatch {
                rows: predictions.len(),
                labels: labels.len(),
            });
        }

        let mut tp = 0;
        let mut fp = 0;
        let mut tn = 0;
        let mut fn_count = 0;

        for (&pred, &label) in predictions.iter().zip(labels.iter()) {
            match (pred, label) {
                (1, 1) => tp += 1,
                (1, 0) => fp += 1,
                (0, 0) => tn += 1,
                (0, 1) => fn_count += 1,
                _ => {}
            }
        }

        let at_risk_precision = ratio(tp, tp + fp);
        let at_risk_recall = ratio(tp, tp + fn_count);
        let at_risk = ClassMetrics {
            precision: at_risk_precision,
            recall: at_risk_recall,
            f1: f1(at_risk_precision, at_risk_recall),
            support: tp + fn_count,
        };

        let safe_precision = ratio(tn, tn + fn_count);
        let safe_recall = ratio(tn, tn + fp);
        let safe = ClassMetrics {
            precision: safe_precision,
            recall: safe_recall,
            f1: f1(safe_precision, safe_recall),
            support: tn + fp,
        };

        let macro_avg = AveragedMetrics {
            precision: (safe.precision + at_risk.precision) / 2.0,
            recall: (safe.recall + at_risk.recall) / 2.0,
            f1: (safe.f1 + at_risk.f1) / 2.0,
        };

        let total = safe.support + at_risk.support;
        let weigh = |a: f64, b: f64| {
            if total > 0 {
                (a * safe.support as f64 + b * at_risk.support as f64) / total as f64
            } else {
                0.0
            }
        };
        let weighted_avg = AveragedMetrics {
            precision: weigh(safe.precision, at_risk.precision),
            recall: weigh(safe.recall, at_risk.recall),
            f1: weigh(safe.f1, at_risk.f1),
        };

        Ok(Self {
            accuracy: ratio(tp + tn, total),
            safe,
            at_risk,
            macro_avg,
            weighted_avg,
            tp,
            fp,
            tn,
            fn_count,
        })
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>14} {:>9} {:>9} {:>9} {:>9}", "", "precision", "recall", "f1-score", "support")?;
        for (name, m) in [("safe (0)", &self.safe), ("at risk (1)", &self.at_risk)] {
            writeln!(
                f,
                "{:>14} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, m.precision, m.recall, m.f1, m.support
            )?;
        }
        let total = self.safe.support + self.at_risk.support;
        writeln!(f, "{:>14} {:>9} {:>9} {:>9.2} {:>9}", "accuracy", "", "", self.accuracy, total)?;
        for (name, m) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>14} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, m.precision, m.recall, m.f1, total
            )?;
        }
        Ok(())
    }
}
