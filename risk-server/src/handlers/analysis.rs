//! Narrative analysis handler

use axum::{extract::{Path, State}, Json};
use risk_core::logic::narrative::StudentProfile;
use serde::Serialize;

use crate::{AppError, AppResult, AppState};
use crate::models::Student;

#[derive(Serialize)]
pub struct AnalysisResponse {
    pub analysis: String,
    pub data: StudentProfile,
}

/// Generate the counsellor digest for one student
pub async fn analyze(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AnalysisResponse>> {
    let student = Student::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found".to_string()))?;

    let data = student.profile(state.narrator.separator());
    let analysis = state.narrator.analyze(&data).await?;

    Ok(Json(AnalysisResponse { analysis, data }))
}
