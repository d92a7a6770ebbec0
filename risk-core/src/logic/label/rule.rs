//! Label Rule Thresholds
//!
//! `risky = grade < grade_floor
//!       || attendance < attendance_floor
//!       || violations > violation_ceiling
//!       || (allowance < allowance_floor && siblings >= sibling_floor)`
//!
//! Floors are exclusive (a value equal to the floor is safe), the ceiling is
//! exclusive (a value equal to the ceiling is safe), and the sibling floor is
//! inclusive.

use serde::{Deserialize, Serialize};

use crate::logic::features::{FeatureTable, FeatureVector, LabeledRow};

/// Rule parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelThresholds {
    /// Grades strictly below this are risky
    pub grade_floor: f64,

    /// Attendance percentages strictly below this are risky
    pub attendance_floor: f64,

    /// Violation counts strictly above this are risky
    pub violation_ceiling: f64,

    /// Allowance strictly below this is risky when combined with many siblings
    pub allowance_floor: f64,

    /// Sibling count at or above this completes the allowance condition
    pub sibling_floor: f64,
}

impl Default for LabelThresholds {
    fn default() -> Self {
        Self {
            grade_floor: 65.0,
            attendance_floor: 75.0,
            violation_ceiling: 9.0,
            allowance_floor: 10_000.0,
            sibling_floor: 3.0,
        }
    }
}

impl LabelThresholds {
    pub fn is_risky(&self, f: &FeatureVector) -> bool {
        f.grade < self.grade_floor
            || f.attendance < self.attendance_floor
            || f.violations > self.violation_ceiling
            || (f.allowance < self.allowance_floor && f.sibling_count >= self.sibling_floor)
    }

    /// Formula label, 1 = at risk
    pub fn label(&self, f: &FeatureVector) -> u8 {
        u8::from(self.is_risky(f))
    }

    /// Override if present, formula otherwise
    pub fn resolve(&self, row: &LabeledRow) -> u8 {
        match row.label_override {
            Some(flag) => u8::from(flag),
            None => self.label(&row.features),
        }
    }
}

/// Count of each class after labelling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClassBalance {
    pub safe: usize,
    pub at_risk: usize,
}

impl ClassBalance {
    pub fn from_labels(labels: &[u8]) -> Self {
        let at_risk = labels.iter().filter(|&&l| l == 1).count();
        Self {
            safe: labels.len() - at_risk,
            at_risk,
        }
    }

    pub fn total(&self) -> usize {
        self.safe + self.at_risk
    }
}

/// Label every row of a table
pub fn label_table(table: &FeatureTable, thresholds: &LabelThresholds) -> Vec<u8> {
    table.rows.iter().map(|row| thresholds.resolve(row)).collect()
}
