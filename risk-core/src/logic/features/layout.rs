//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the feature schema**
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION
//!
//! Trained artifacts record the layout hash and the ordered feature names,
//! so a layout change is detected when the model is loaded.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

pub const ATTENDANCE: &str = "attendance";
pub const GRADE: &str = "grade";
pub const VIOLATIONS: &str = "violations";
pub const ALLOWANCE: &str = "allowance";
pub const SIBLING_COUNT: &str = "sibling_count";

/// Feature names in the exact order the classifier is fitted on
pub const FEATURE_LAYOUT: &[&str] = &[
    ATTENDANCE,     // 0: Attendance percentage (0-100)
    GRADE,          // 1: Average grade
    VIOLATIONS,     // 2: Disciplinary violation points
    ALLOWANCE,      // 3: Pocket money, currency units
    SIBLING_COUNT,  // 4: Number of siblings
];

/// Total number of features
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 5;

/// Header spellings accepted from older spreadsheets and exports
const COLUMN_ALIASES: &[(&str, &str)] = &[
    ("kehadiran", ATTENDANCE),
    ("nilai", GRADE),
    ("pelanggaran", VIOLATIONS),
    ("uang_saku", ALLOWANCE),
    ("jml_saudara", SIBLING_COUNT),
    ("siblingcount", SIBLING_COUNT),
    ("siblings", SIBLING_COUNT),
];

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// Compute CRC32 hash of the feature layout
pub fn compute_layout_hash() -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[FEATURE_VERSION]);

    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

pub fn layout_hash() -> u32 {
    compute_layout_hash()
}

/// Complete layout information for serialization/logging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

// ============================================================================
// COLUMN NAME NORMALIZATION
// ============================================================================

/// Normalize a raw header: trim, lowercase, inner whitespace and hyphens to `_`
pub fn normalize_header(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_sep = false;

    for ch in lowered.chars() {
        if ch.is_whitespace() || ch == '-' {
            pending_sep = !out.is_empty();
            continue;
        }
        if pending_sep {
            out.push('_');
            pending_sep = false;
        }
        out.push(ch);
    }

    out
}

/// Resolve a raw header to its canonical feature name, if it names one
pub fn canonical_column(raw: &str) -> Option<&'static str> {
    let normalized = normalize_header(raw);

    if let Some(name) = FEATURE_LAYOUT.iter().find(|&&n| n == normalized) {
        return Some(name);
    }

    COLUMN_ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map(|(_, name)| *name)
}

/// Get feature index by name
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_count() {
        assert_eq!(FEATURE_LAYOUT.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_layout_hash_consistency() {
        assert_eq!(compute_layout_hash(), compute_layout_hash());
        assert_ne!(layout_hash(), 0);
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("  Attendance "), "attendance");
        assert_eq!(normalize_header("Sibling   Count"), "sibling_count");
        assert_eq!(normalize_header("sibling-count"), "sibling_count");
        assert_eq!(normalize_header("UANG_SAKU"), "uang_saku");
    }

    #[test]
    fn test_canonical_column_aliases() {
        assert_eq!(canonical_column("Kehadiran"), Some(ATTENDANCE));
        assert_eq!(canonical_column(" jml_saudara"), Some(SIBLING_COUNT));
        assert_eq!(canonical_column("SiblingCount"), Some(SIBLING_COUNT));
        assert_eq!(canonical_column("Grade"), Some(GRADE));
        assert_eq!(canonical_column("name"), None);
    }
}
