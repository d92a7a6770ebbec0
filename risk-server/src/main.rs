//! Student Risk Tracker - Dashboard API Server
//!
//! Form-based record API. Every submission is scored by the random-forest
//! model from `risk-train`; counsellor digests come from the narrative
//! backend on demand.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                  STUDENT RISK TRACKER                  │
//! ├────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌──────────────┐  ┌────────────────┐  │
//! │  │  API      │  │ RiskPredictor│  │ Narrative      │  │
//! │  │  (Axum)   │  │ (forest)     │  │ (Gemini)       │  │
//! │  └─────┬─────┘  └──────┬───────┘  └────────────────┘  │
//! │        └───────────────┤                              │
//! │                        ▼                              │
//! │                 ┌─────────────┐                       │
//! │                 │   SQLite    │                       │
//! │                 └─────────────┘                       │
//! └────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;
mod models;
mod handlers;
mod error;


use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use risk_core::logic::model::{FileModelRepository, RiskPredictor};
use risk_core::logic::narrative::{GeminiClient, NarrativeGenerator};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "risk_server=debug,risk_core=info,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = config::Config::from_env();

    tracing::info!("Student Risk Tracker starting ({})", config.environment);
    if !config.is_production() {
        tracing::info!("Database: {}", config.database_url);
    }

    // Initialize database pool
    let pool = db::create_pool(&config.database_url)
        .await
        .context("Failed to create database pool")?;

    // Run migrations
    tracing::info!("Running database migrations...");
    db::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    // Model + narrative backend
    let repository = Arc::new(FileModelRepository::open(&config.model_path));
    let predictor = Arc::new(RiskPredictor::new(repository));

    let backend = GeminiClient::new(config.gemini()).context("Failed to create narrative client")?;
    let narrator = Arc::new(
        NarrativeGenerator::new(Arc::new(backend)).with_separator(config.thousands_separator),
    );

    // Build application state
    let state = AppState {
        pool,
        config: config.clone(),
        predictor,
        narrator,
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::SqlitePool,
    pub config: config::Config,
    pub predictor: Arc<RiskPredictor>,
    pub narrator: Arc<NarrativeGenerator>,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    let student_routes = Router::new()
        .route("/api/v1/students", get(handlers::students::list).post(handlers::students::create))
        .route(
            "/api/v1/students/:id",
            get(handlers::students::get).delete(handlers::students::delete),
        )
        .route("/api/v1/students/:id/rescore", post(handlers::students::rescore))
        .route("/api/v1/students/:id/analysis", get(handlers::analysis::analyze));

    let model_routes = Router::new()
        .route("/api/v1/model", get(handlers::model::status))
        .route("/api/v1/model/reload", post(handlers::model::reload));

    // Combine all routes
    Router::new()
        .route("/health", get(handlers::health::check))
        .merge(student_routes)
        .merge(model_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
