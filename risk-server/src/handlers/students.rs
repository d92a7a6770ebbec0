//! Student record handlers

use axum::{
    extract::{rejection::FormRejection, Path, State},
    http::StatusCode,
    Form, Json,
};
use serde::Serialize;
use validator::Validate;

use crate::{AppError, AppResult, AppState};
use crate::models::{NewStudent, NewStudentForm, Student};

#[derive(Serialize)]
pub struct StudentResponse {
    pub message: String,
    pub student: Student,
    /// True when the score is the neutral fallback
    pub score_degraded: bool,
}

/// List all students
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Student>>> {
    let students = Student::list(&state.pool).await?;
    Ok(Json(students))
}

/// Get single student
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Student>> {
    let student = Student::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found".to_string()))?;

    Ok(Json(student))
}

/// Score and store a submitted form
pub async fn create(
    State(state): State<AppState>,
    form: Result<Form<NewStudentForm>, FormRejection>,
) -> AppResult<(StatusCode, Json<StudentResponse>)> {
    let Form(form) = form.map_err(|e| AppError::ValidationError(e.body_text()))?;
    form.validate()?;
    if !form.attendance.is_finite() || !form.grade.is_finite() {
        return Err(AppError::ValidationError("attendance and grade must be numbers".to_string()));
    }

    let data = NewStudent::from(form);
    let score = state.predictor.score(&data.features());
    if let Some(reason) = &score.degraded {
        tracing::warn!("Storing neutral risk score for {}: {}", data.nisn, reason);
    }

    let student = Student::create(&state.pool, &data, score.percent()).await?;
    tracing::info!("Added student {} (id {}, risk {})", student.nisn, student.id, score.percent());

    Ok((
        StatusCode::CREATED,
        Json(StudentResponse {
            message: format!("{} was added successfully", student.name),
            student,
            score_degraded: score.is_degraded(),
        }),
    ))
}

/// Recompute the risk score with the current model
pub async fn rescore(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<StudentResponse>> {
    let existing = Student::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found".to_string()))?;

    let score = state.predictor.score(&existing.features());
    let student = Student::update_risk_score(&state.pool, id, score.percent())
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found".to_string()))?;

    Ok(Json(StudentResponse {
        message: format!("Risk score for {} recalculated", student.name),
        student,
        score_degraded: score.is_degraded(),
    }))
}

/// Delete a student
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if !Student::delete(&state.pool, id).await? {
        return Err(AppError::NotFound("Student not found".to_string()));
    }

    tracing::info!("Deleted student {}", id);
    Ok(StatusCode::NO_CONTENT)
}
