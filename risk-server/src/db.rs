//! Database module - SQLite connection and migrations

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

/// Create database connection pool
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await
}

/// Run database migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // SQLite prepares one statement at a time
    for statement in SCHEMA_SQL.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        sqlx::query(statement).execute(pool).await?;
    }

    tracing::info!("Database schema applied successfully");
    Ok(())
}

/// Database schema SQL
const SCHEMA_SQL: &str = r#"
-- Student records
CREATE TABLE IF NOT EXISTS students (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    nisn TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    parent_occupation TEXT NOT NULL,
    birth_order INTEGER NOT NULL,
    sibling_count INTEGER NOT NULL,
    allowance INTEGER NOT NULL,
    organization TEXT NOT NULL DEFAULT 'None',
    hobby TEXT NOT NULL DEFAULT 'None',
    attendance REAL NOT NULL,
    grade REAL NOT NULL,
    violations INTEGER NOT NULL,
    notes TEXT NOT NULL,
    risk_score REAL,
    created_at TEXT NOT NULL
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_students_name ON students(name);
"#;
