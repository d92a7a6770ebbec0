//! Which sources feed a training run

use std::path::PathBuf;

use crate::logic::features::{demo_table, read_record_store, read_spreadsheet, RawTable};

/// Default spreadsheet, relative to the working directory
pub const DEFAULT_SPREADSHEET: &str = "training_data.xlsx";

#[derive(Debug, Clone, Default)]
pub struct TrainingSources {
    /// Record store URL, e.g. `sqlite://students.db`
    pub database_url: Option<String>,
    pub spreadsheets: Vec<PathBuf>,
    /// Append the built-in demo rows
    pub demo_data: bool,
}

impl TrainingSources {
    /// Read every configured source.
    ///
    /// Missing files are skipped. A source that exists but cannot be read is
    /// logged and skipped; the builder decides whether anything usable is left.
    pub async fn collect(&self) -> Vec<RawTable> {
        let mut tables = Vec::new();

        if let Some(url) = &self.database_url {
            match read_record_store(url).await {
                Ok(Some(table)) if table.is_empty() => {
                    log::info!("Record store has no students yet, skipping");
                }
                Ok(Some(table)) => {
                    log::info!("Found {} rows in the record store", table.len());
                    tables.push(table);
                }
                Ok(None) => {}
                Err(e) => log::error!("Failed to read record store: {}", e),
            }
        }

        for path in &self.spreadsheets {
            if !path.exists() {
                log::info!("Spreadsheet not found at {}, skipping", path.display());
                continue;
            }
            match read_spreadsheet(path) {
                Ok(table) => {
                    log::info!("Found {} rows in {}", table.len(), path.display());
                    tables.push(table);
                }
                Err(e) => log::error!("Failed to read spreadsheet: {}", e),
            }
        }

        if self.demo_data {
            let table = demo_table();
            log::info!("Adding {} demo rows", table.len());
            tables.push(table);
        }

        tables
    }

    /// Human-readable list for diagnostics
    pub fn describe(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(url) = &self.database_url {
            out.push(format!("record store {}", url));
        }
        out.extend(self.spreadsheets.iter().map(|p| format!("spreadsheet {}", p.display())));
        if self.demo_data {
            out.push("demo data".to_string());
        }
        out
    }
}
