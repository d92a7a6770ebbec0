//! Student model

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use risk_core::logic::features::FeatureVector;
use risk_core::logic::narrative::{format_grouped, StudentProfile};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use validator::{Validate, ValidationError};

pub const DEFAULT_ACTIVITY: &str = "None";
pub const DEFAULT_NOTES: &str = "No special notes.";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub id: i64,
    pub nisn: String,
    pub name: String,
    pub parent_occupation: String,
    pub birth_order: i64,
    pub sibling_count: i64,
    pub allowance: i64,
    pub organization: String,
    pub hobby: String,
    pub attendance: f64,
    pub grade: f64,
    pub violations: i64,
    pub notes: String,
    /// 0-100, set at insertion and by explicit rescoring
    pub risk_score: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Submission form (`application/x-www-form-urlencoded`)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewStudentForm {
    #[validate(length(min = 1, max = 32, message = "nisn is required"), custom(function = "not_blank"))]
    pub nisn: String,

    #[validate(length(min = 1, max = 255, message = "name is required"), custom(function = "not_blank"))]
    pub name: String,

    #[validate(length(min = 1, max = 255, message = "parent_occupation is required"), custom(function = "not_blank"))]
    pub parent_occupation: String,

    #[validate(range(min = 1, message = "birth_order starts at 1"))]
    pub birth_order: i64,

    #[validate(range(min = 0, message = "sibling_count cannot be negative"))]
    pub sibling_count: i64,

    #[validate(range(min = 0, message = "allowance cannot be negative"))]
    pub allowance: i64,

    pub organization: Option<String>,

    pub hobby: Option<String>,

    #[validate(range(min = 0.0, max = 100.0, message = "attendance must be between 0 and 100"))]
    pub attendance: f64,

    #[validate(range(min = 0.0, message = "grade cannot be negative"))]
    pub grade: f64,

    #[validate(range(min = 0, message = "violations cannot be negative"))]
    pub violations: i64,

    pub notes: Option<String>,
}

/// A validated form with defaults applied
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub nisn: String,
    pub name: String,
    pub parent_occupation: String,
    pub birth_order: i64,
    pub sibling_count: i64,
    pub allowance: i64,
    pub organization: String,
    pub hobby: String,
    pub attendance: f64,
    pub grade: f64,
    pub violations: i64,
    pub notes: String,
}

/// Required text fields must hold more than whitespace
fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some(Cow::from("must not be blank"));
        return Err(error);
    }
    Ok(())
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl From<NewStudentForm> for NewStudent {
    fn from(form: NewStudentForm) -> Self {
        Self {
            nisn: form.nisn.trim().to_string(),
            name: form.name.trim().to_string(),
            parent_occupation: form.parent_occupation.trim().to_string(),
            birth_order: form.birth_order,
            sibling_count: form.sibling_count,
            allowance: form.allowance,
            organization: or_default(form.organization, DEFAULT_ACTIVITY),
            hobby: or_default(form.hobby, DEFAULT_ACTIVITY),
            attendance: form.attendance,
            grade: form.grade,
            violations: form.violations,
            notes: or_default(form.notes, DEFAULT_NOTES),
        }
    }
}

impl NewStudent {
    pub fn features(&self) -> FeatureVector {
        FeatureVector::new(
            self.attendance,
            self.grade,
            self.violations as f64,
            self.allowance as f64,
            self.sibling_count as f64,
        )
    }
}

impl Student {
    pub fn features(&self) -> FeatureVector {
        FeatureVector::new(
            self.attendance,
            self.grade,
            self.violations as f64,
            self.allowance as f64,
            self.sibling_count as f64,
        )
    }

    /// Display profile for the narrative
    pub fn profile(&self, separator: char) -> StudentProfile {
        StudentProfile {
            nisn: self.nisn.clone(),
            name: self.name.clone(),
            birth_order: self.birth_order,
            sibling_count: self.sibling_count,
            parent_occupation: self.parent_occupation.clone(),
            allowance: format_grouped(self.allowance, separator),
            organization: self.organization.clone(),
            hobby: self.hobby.clone(),
            attendance: self.attendance,
            grade: self.grade,
            violations: self.violations,
            risk_score: self.risk_score,
            notes: self.notes.clone(),
        }
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &NewStudent,
        risk_score: f64,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Student>(
            r#"
            INSERT INTO students (
                nisn, name, parent_occupation, birth_order, sibling_count, allowance,
                organization, hobby, attendance, grade, violations, notes, risk_score, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#
        )
        .bind(&data.nisn)
        .bind(&data.name)
        .bind(&data.parent_occupation)
        .bind(data.birth_order)
        .bind(data.sibling_count)
        .bind(data.allowance)
        .bind(&data.organization)
        .bind(&data.hobby)
        .bind(data.attendance)
        .bind(data.grade)
        .bind(data.violations)
        .bind(&data.notes)
        .bind(risk_score)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn list(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Student>("SELECT * FROM students ORDER BY id")
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Student>("SELECT * FROM students WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn update_risk_score(
        pool: &SqlitePool,
        id: i64,
        risk_score: f64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Student>(
            "UPDATE students SET risk_score = ? WHERE id = ? RETURNING *"
        )
        .bind(risk_score)
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Returns false when no such student exists
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM students WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
