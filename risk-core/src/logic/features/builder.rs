//! Feature Builder - concatenates heterogeneous sources into one table
//! restricted to the canonical feature columns.

use thiserror::Error;

use super::layout::{canonical_column, feature_index, normalize_header, FEATURE_COUNT, FEATURE_LAYOUT};
use super::table::{Cell, FeatureTable, LabeledRow, RawTable, SourceSummary};
use super::vector::FeatureVector;

/// Default name of the manual label column in spreadsheets
pub const DEFAULT_LABEL_COLUMN: &str = "label";

#[derive(Debug, Error)]
pub enum FeatureError {
    /// No source produced a single row
    #[error("no training data available: {0}")]
    Configuration(String),

    #[error("{origin}, data row {row}: column '{column}' {reason}")]
    Data {
        origin: String,
        row: usize,
        column: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct FeatureBuilder {
    label_column: Option<String>,
}

impl Default for FeatureBuilder {
    fn default() -> Self {
        Self {
            label_column: Some(DEFAULT_LABEL_COLUMN.to_string()),
        }
    }
}

impl FeatureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Column holding manual labels; `None` disables overrides entirely
    pub fn with_label_column(mut self, column: Option<&str>) -> Self {
        self.label_column = column.map(normalize_header);
        self
    }

    /// Concatenate all usable sources.
    ///
    /// Sources missing a required column are skipped with a warning. Fails
    /// with [`FeatureError::Configuration`] when nothing is left.
    pub fn build(&self, tables: Vec<RawTable>) -> Result<FeatureTable, FeatureError> {
        let mut out = FeatureTable::default();
        let mut checked = Vec::with_capacity(tables.len());

        for table in tables {
            checked.push(table.source.clone());

            let Some(rows) = self.extract(&table)? else {
                continue;
            };

            log::info!("Loaded {} rows from {}", rows.len(), table.source);
            out.sources.push(SourceSummary {
                source: table.source.clone(),
                rows: rows.len(),
            });
            out.rows.extend(rows);
        }

        if out.rows.is_empty() {
            let detail = if checked.is_empty() {
                "no sources configured".to_string()
            } else {
                format!("no rows in any source (checked: {})", checked.join(", "))
            };
            return Err(FeatureError::Configuration(detail));
        }

        Ok(out)
    }

    fn extract(&self, table: &RawTable) -> Result<Option<Vec<LabeledRow>>, FeatureError> {
        let mut columns: [Option<usize>; FEATURE_COUNT] = [None; FEATURE_COUNT];
        let mut label_idx = None;

        for (i, header) in table.headers.iter().enumerate() {
            if let Some(slot) = canonical_column(header).and_then(feature_index) {
                // First matching header wins
                columns[slot].get_or_insert(i);
            } else if self.label_column.as_deref() == Some(normalize_header(header).as_str()) {
                label_idx = Some(i);
            }
        }

        let missing: Vec<&str> = FEATURE_LAYOUT
            .iter()
            .zip(columns.iter())
            .filter(|(_, idx)| idx.is_none())
            .map(|(name, _)| *name)
            .collect();

        if !missing.is_empty() {
            log::warn!(
                "Skipping {}: missing required columns {:?} (required: {:?})",
                table.source, missing, FEATURE_LAYOUT
            );
            return Ok(None);
        }

        if table.is_empty() {
            log::info!("{} has no rows, skipping", table.source);
            return Ok(None);
        }

        let mut rows = Vec::with_capacity(table.len());

        for (r, row) in table.rows.iter().enumerate() {
            let mut values = [0.0f64; FEATURE_COUNT];

            for (slot, idx) in columns.iter().enumerate() {
                let Some(idx) = idx else { continue };
                let cell = row.get(*idx).unwrap_or(&Cell::Empty);
                values[slot] = cell
                    .as_number()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| FeatureError::Data {
                        origin: table.source.clone(),
                        row: r + 1,
                        column: FEATURE_LAYOUT[slot].to_string(),
                        reason: describe_bad_cell(cell),
                    })?;
            }

            let label_override = match label_idx {
                Some(idx) => {
                    let cell = row.get(idx).unwrap_or(&Cell::Empty);
                    parse_override(cell).map_err(|reason| FeatureError::Data {
                        origin: table.source.clone(),
                        row: r + 1,
                        column: table.headers[idx].clone(),
                        reason,
                    })?
                }
                None => None,
            };

            rows.push(LabeledRow {
                features: FeatureVector::from(values),
                label_override,
            });
        }

        Ok(Some(rows))
    }
}

fn describe_bad_cell(cell: &Cell) -> String {
    match cell {
        Cell::Empty => "is empty".to_string(),
        Cell::Text(s) => format!("is not numeric ({:?})", s),
        Cell::Number(v) => format!("is not finite ({})", v),
        other => format!("has unusable value {:?}", other),
    }
}

/// Interpret a manual label cell. Empty means "no override".
pub fn parse_override(cell: &Cell) -> Result<Option<bool>, String> {
    match cell {
        Cell::Empty => Ok(None),
        Cell::Bool(b) => Ok(Some(*b)),
        Cell::Number(v) if *v == 1.0 => Ok(Some(true)),
        Cell::Number(v) if *v == 0.0 => Ok(Some(false)),
        Cell::Number(v) => Err(format!("label must be 0 or 1, got {}", v)),
        Cell::Text(s) => match s.trim().to_lowercase().as_str() {
            "" => Ok(None),
            "1" | "true" | "yes" | "y" => Ok(Some(true)),
            "0" | "false" | "no" | "n" => Ok(Some(false)),
            other => Err(format!("label {:?} is not a boolean", other)),
        },
    }
}
