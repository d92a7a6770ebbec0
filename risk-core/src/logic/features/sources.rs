//! Training data sources
//!
//! Every reader produces a [`RawTable`]; typing and column selection happen
//! in the builder. Readers never write to their inputs.

use std::path::Path;
use std::str::FromStr;

use calamine::{open_workbook_auto, Data, Reader};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{ConnectOptions, Row};
use thiserror::Error;

use super::layout::FEATURE_LAYOUT;
use super::table::{Cell, RawTable};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("spreadsheet {path}: {message}")]
    Spreadsheet { path: String, message: String },

    #[error("csv {path}: {error}")]
    Csv { path: String, error: csv::Error },

    #[error("record store: {0}")]
    Database(#[from] sqlx::Error),
}

// ============================================================================
// SPREADSHEETS
// ============================================================================

/// Read the first sheet of a workbook (or a CSV file) into a raw table.
/// The first row is taken as the header.
pub fn read_spreadsheet(path: &Path) -> Result<RawTable, SourceError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if ext == "csv" {
        return read_csv(path);
    }

    let display = path.display().to_string();
    let spreadsheet_err = |message: String| SourceError::Spreadsheet {
        path: display.clone(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| spreadsheet_err(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| spreadsheet_err("workbook has no sheets".to_string()))?
        .map_err(|e| spreadsheet_err(e.to_string()))?;

    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|header| header.iter().map(|c| c.to_string()).collect())
        .unwrap_or_default();

    let mut table = RawTable::new(format!("spreadsheet {}", display), headers);
    for row in rows {
        let cells: Vec<Cell> = row.iter().map(cell_from_data).collect();
        // Trailing blank lines are common in hand-edited sheets
        if cells.iter().all(Cell::is_empty) {
            continue;
        }
        table.push_row(cells);
    }

    Ok(table)
}

pub(crate) fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Int(v) => Cell::Number(*v as f64),
        Data::Float(v) => Cell::Number(*v),
        Data::Bool(b) => Cell::Bool(*b),
        Data::String(s) => Cell::from_text(s),
        other => Cell::Text(other.to_string()),
    }
}

fn read_csv(path: &Path) -> Result<RawTable, SourceError> {
    let display = path.display().to_string();
    let csv_err = |error: csv::Error| SourceError::Csv {
        path: display.clone(),
        error,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_err)?;

    let headers = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut table = RawTable::new(format!("csv {}", display), headers);
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        let cells: Vec<Cell> = record.iter().map(Cell::from_text).collect();
        if cells.iter().all(Cell::is_empty) {
            continue;
        }
        table.push_row(cells);
    }

    Ok(table)
}

// ============================================================================
// RECORD STORE
// ============================================================================

// Cast so integer columns decode as f64
const RECORD_STORE_QUERY: &str = r#"
    SELECT
        CAST(attendance AS REAL) AS attendance,
        CAST(grade AS REAL) AS grade,
        CAST(violations AS REAL) AS violations,
        CAST(allowance AS REAL) AS allowance,
        CAST(sibling_count AS REAL) AS sibling_count
    FROM students
"#;

/// Read the feature columns of every persisted student.
///
/// Returns `Ok(None)` when the database file does not exist yet.
pub async fn read_record_store(database_url: &str) -> Result<Option<RawTable>, SourceError> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(false)
        .read_only(true);

    let filename = options.get_filename();
    if filename != Path::new(":memory:") && !filename.exists() {
        log::info!("Record store {} does not exist yet, skipping", filename.display());
        return Ok(None);
    }

    let mut conn = match options.connect().await {
        Ok(conn) => conn,
        Err(sqlx::Error::Database(e)) => {
            log::info!("Record store not available ({}), skipping", e);
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let rows = sqlx::query(RECORD_STORE_QUERY).fetch_all(&mut conn).await?;

    let headers = FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect();
    let mut table = RawTable::new("record store", headers);
    for row in rows {
        let mut cells = Vec::with_capacity(FEATURE_LAYOUT.len());
        for name in FEATURE_LAYOUT {
            let value: Option<f64> = row.try_get(*name)?;
            cells.push(value.map(Cell::Number).unwrap_or(Cell::Empty));
        }
        table.push_row(cells);
    }

    Ok(Some(table))
}

// ============================================================================
// DEMO DATA
// ============================================================================

/// Seed rows for a fresh installation with no real data yet:
/// (attendance, grade, violations, allowance, sibling_count)
const DEMO_ROWS: [[f64; 5]; 10] = [
    [95.0, 85.0, 0.0, 50000.0, 1.0],
    [80.0, 70.0, 2.0, 20000.0, 3.0],
    [60.0, 55.0, 5.0, 10000.0, 5.0],
    [90.0, 88.0, 0.0, 45000.0, 2.0],
    [50.0, 40.0, 8.0, 5000.0, 6.0],
    [98.0, 90.0, 0.0, 60000.0, 1.0],
    [75.0, 65.0, 3.0, 15000.0, 4.0],
    [88.0, 78.0, 1.0, 30000.0, 2.0],
    [40.0, 35.0, 10.0, 5000.0, 7.0],
    [85.0, 72.0, 2.0, 25000.0, 3.0],
];

/// Built-in bootstrap table
pub fn demo_table() -> RawTable {
    let headers = FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect();
    let mut table = RawTable::new("demo data", headers);
    for row in DEMO_ROWS {
        table.push_row(row.iter().map(|v| Cell::Number(*v)).collect());
    }
    table
}
