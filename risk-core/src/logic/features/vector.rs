//! Feature Vector - Named classifier input
//!
//! Values are addressed by name so that a model fitted on a different
//! column order still receives each value in the slot it was trained on.

use serde::{Deserialize, Serialize};
use super::layout::{
    ALLOWANCE, ATTENDANCE, FEATURE_COUNT, FEATURE_LAYOUT, GRADE, SIBLING_COUNT, VIOLATIONS,
};

/// The five canonical student features
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureVector {
    pub attendance: f64,
    pub grade: f64,
    pub violations: f64,
    pub allowance: f64,
    pub sibling_count: f64,
}

impl FeatureVector {
    pub fn new(
        attendance: f64,
        grade: f64,
        violations: f64,
        allowance: f64,
        sibling_count: f64,
    ) -> Self {
        Self { attendance, grade, violations, allowance, sibling_count }
    }

    /// Look up a feature by its canonical name
    pub fn get(&self, name: &str) -> Option<f64> {
        match name {
            ATTENDANCE => Some(self.attendance),
            GRADE => Some(self.grade),
            VIOLATIONS => Some(self.violations),
            ALLOWANCE => Some(self.allowance),
            SIBLING_COUNT => Some(self.sibling_count),
            _ => None,
        }
    }

    /// Set a feature by canonical name. Returns false for unknown names.
    pub fn set(&mut self, name: &str, value: f64) -> bool {
        let slot = match name {
            ATTENDANCE => &mut self.attendance,
            GRADE => &mut self.grade,
            VIOLATIONS => &mut self.violations,
            ALLOWANCE => &mut self.allowance,
            SIBLING_COUNT => &mut self.sibling_count,
            _ => return false,
        };
        *slot = value;
        true
    }

    /// Values in FEATURE_LAYOUT order
    pub fn as_array(&self) -> [f64; FEATURE_COUNT] {
        [self.attendance, self.grade, self.violations, self.allowance, self.sibling_count]
    }

    /// Values ordered by an arbitrary list of names.
    /// Fails with the first name that is not a known feature.
    pub fn ordered_by<'a, I>(&self, names: I) -> Result<Vec<f64>, String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        names
            .into_iter()
            .map(|name| self.get(name).ok_or_else(|| name.to_string()))
            .collect()
    }

    pub fn is_finite(&self) -> bool {
        self.as_array().iter().all(|v| v.is_finite())
    }

    pub fn names() -> &'static [&'static str] {
        FEATURE_LAYOUT
    }
}

impl From<[f64; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f64; FEATURE_COUNT]) -> Self {
        Self::new(values[0], values[1], values[2], values[3], values[4])
    }
}
