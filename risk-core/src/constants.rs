//! Central Configuration Constants
//!
//! Defaults shared by the trainer and the server. Both read the same
//! environment variables, so a single `.env` configures the whole install.

/// Record store used by both binaries
pub const DEFAULT_DATABASE_URL: &str = "sqlite://students.db?mode=rwc";

/// Spreadsheet the trainer looks for when none is given
pub const DEFAULT_SPREADSHEET: &str = crate::logic::trainer::sources::DEFAULT_SPREADSHEET;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Student Risk Tracker";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Record store URL from `DATABASE_URL` or the default
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Model artifact path from `MODEL_PATH` or the default
pub fn get_model_path() -> String {
    std::env::var("MODEL_PATH")
        .unwrap_or_else(|_| crate::logic::model::DEFAULT_MODEL_PATH.to_string())
}
