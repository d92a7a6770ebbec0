//! Tabular containers shared by every training source

use serde::{Deserialize, Serialize};
use super::vector::FeatureVector;

/// A single cell as read from a source, before typing
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Bool(bool),
    Text(String),
}

impl Cell {
    /// Parse free text the way a spreadsheet export would have written it
    pub fn from_text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(v) => Cell::Number(v),
            Err(_) => Cell::Text(trimmed.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            Cell::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Cell::Text(s) => s.trim().parse().ok(),
            Cell::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

/// Untyped rows from one source, with the headers exactly as read
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub source: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(source: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            source: source.into(),
            headers,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Feature values plus an optional manually assigned label
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabeledRow {
    pub features: FeatureVector,
    /// `Some(true)` forces at-risk, `Some(false)` forces safe, `None` defers to the rule
    pub label_override: Option<bool>,
}

impl LabeledRow {
    pub fn new(features: FeatureVector) -> Self {
        Self { features, label_override: None }
    }

    pub fn with_override(features: FeatureVector, label: bool) -> Self {
        Self { features, label_override: Some(label) }
    }
}

/// Row counts contributed by one source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSummary {
    pub source: String,
    pub rows: usize,
}

/// Concatenated canonical feature table
#[derive(Debug, Clone, Default)]
pub struct FeatureTable {
    pub rows: Vec<LabeledRow>,
    pub sources: Vec<SourceSummary>,
}

impl FeatureTable {
    pub fn from_rows(rows: Vec<LabeledRow>) -> Self {
        let sources = vec![SourceSummary { source: "inline".to_string(), rows: rows.len() }];
        Self { rows, sources }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn overrides(&self) -> usize {
        self.rows.iter().filter(|r| r.label_override.is_some()).count()
    }
}
