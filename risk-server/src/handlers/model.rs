//! Model status and reload handlers

use axum::{extract::State, Json};
use risk_core::logic::model::EngineStatus;

use crate::{AppError, AppResult, AppState};

pub async fn status(State(state): State<AppState>) -> Json<EngineStatus> {
    Json(state.predictor.status())
}

/// Re-read the artifact; the previous model stays active on failure
pub async fn reload(State(state): State<AppState>) -> AppResult<Json<EngineStatus>> {
    let predictor = state.predictor.clone();
    let reloaded = tokio::task::spawn_blocking(move || predictor.reload())
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    if !reloaded {
        return Err(AppError::ServiceUnavailable(format!(
            "No usable model at {}; run risk-train first",
            state.config.model_path
        )));
    }

    tracing::info!("Model reloaded from {}", state.config.model_path);
    Ok(Json(state.predictor.status()))
}
