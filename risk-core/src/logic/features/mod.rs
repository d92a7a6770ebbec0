//! Features Module - Feature Builder
//!
//! Assembles the canonical 5-column feature table from one or more
//! heterogeneous sources (record store, spreadsheets, demo data).

pub mod layout;
pub mod vector;
pub mod table;
pub mod builder;
pub mod sources;

#[cfg(test)]
mod tests;

// Re-export common types
pub use layout::{FEATURE_COUNT, FEATURE_LAYOUT, LayoutInfo, layout_hash};
pub use vector::FeatureVector;
pub use table::{Cell, FeatureTable, LabeledRow, RawTable, SourceSummary};
pub use builder::{FeatureBuilder, FeatureError, DEFAULT_LABEL_COLUMN};
pub use sources::{demo_table, read_record_store, read_spreadsheet, SourceError};
