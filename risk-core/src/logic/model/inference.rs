//! Inference Engine - request-time risk scoring
//!
//! `RiskPredictor::predict` reports every failure as a `PredictionError`.
//! `RiskPredictor::score` is the call boundary: it hands the result to the
//! `FallbackPolicy`, which substitutes the neutral probability, logs the
//! cause and counts the event.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logic::features::FeatureVector;
use super::artifact::TrainingSummary;
use super::repository::{LoadedModel, ModelRepository};

/// Probability returned when no trustworthy prediction is available
pub const NEUTRAL_PROBABILITY: f64 = 0.5;

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PredictionError {
    #[error("no model loaded")]
    NoModel,

    #[error("model expects unknown feature '{0}'")]
    UnknownFeature(String),

    #[error("input feature '{0}' is not finite")]
    NonFiniteInput(String),

    #[error("model rejected input: {0}")]
    Model(String),

    #[error("model produced probability {0} outside [0, 1]")]
    InvalidOutput(f64),
}

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Outcome of scoring one record
#[derive(Debug, Clone, PartialEq)]
pub struct RiskScore {
    /// Class-1 (at-risk) probability in [0, 1]
    pub probability: f64,
    /// Set when the probability is the policy fallback
    pub degraded: Option<PredictionError>,
}

impl RiskScore {
    /// Persisted 0-100 score
    pub fn percent(&self) -> f64 {
        (self.probability * 100.0).round()
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}

/// Maps prediction errors to a neutral score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackPolicy {
    pub neutral: f64,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self { neutral: NEUTRAL_PROBABILITY }
    }
}

impl FallbackPolicy {
    pub fn resolve(&self, result: Result<f64, PredictionError>) -> RiskScore {
        match result {
            Ok(probability) => RiskScore { probability, degraded: None },
            Err(e) => {
                match e {
                    PredictionError::NoModel => log::debug!("No model loaded, using neutral score"),
                    ref other => log::warn!("Prediction failed ({}), using neutral score", other),
                }
                RiskScore { probability: self.neutral, degraded: Some(e) }
            }
        }
    }
}

/// Engine status for the dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub model_loaded: bool,
    pub model_origin: Option<String>,
    pub loaded_at: Option<DateTime<Utc>>,
    pub feature_names: Vec<String>,
    pub n_trees: usize,
    pub training: Option<TrainingSummary>,
    pub inference_count: u64,
    pub fallback_count: u64,
    pub avg_latency_us: f64,
}

// ============================================================================
// PREDICTOR
// ============================================================================

pub struct RiskPredictor {
    repository: Arc<dyn ModelRepository>,
    policy: FallbackPolicy,
    inference_count: AtomicU64,
    fallback_count: AtomicU64,
    latency_sum_us: AtomicU64,
}

impl RiskPredictor {
    pub fn new(repository: Arc<dyn ModelRepository>) -> Self {
        Self::with_policy(repository, FallbackPolicy::default())
    }

    pub fn with_policy(repository: Arc<dyn ModelRepository>, policy: FallbackPolicy) -> Self {
        Self {
            repository,
            policy,
            inference_count: AtomicU64::new(0),
            fallback_count: AtomicU64::new(0),
            latency_sum_us: AtomicU64::new(0),
        }
    }

    /// Class-1 probability for one record, or why it could not be computed
    pub fn predict(&self, features: &FeatureVector) -> Result<f64, PredictionError> {
        let model = self.repository.current().ok_or(PredictionError::NoModel)?;
        predict_with(&model, features)
    }

    /// Predict, then apply the fallback policy. Never fails.
    pub fn score(&self, features: &FeatureVector) -> RiskScore {
        let start = Instant::now();
        let score = self.policy.resolve(self.predict(features));

        self.inference_count.fetch_add(1, Ordering::Relaxed);
        self.latency_sum_us
            .fetch_add(start.elapsed().as_micros() as u64, Ordering::Relaxed);
        if score.is_degraded() {
            self.fallback_count.fetch_add(1, Ordering::Relaxed);
        }

        score
    }

    /// Ask the repository to re-read its storage
    pub fn reload(&self) -> bool {
        self.repository.load().is_some()
    }

    pub fn is_model_loaded(&self) -> bool {
        self.repository.current().is_some()
    }

    pub fn fallback_count(&self) -> u64 {
        self.fallback_count.load(Ordering::Relaxed)
    }

    pub fn status(&self) -> EngineStatus {
        let model = self.repository.current();
        let count = self.inference_count.load(Ordering::Relaxed);
        let sum = self.latency_sum_us.load(Ordering::Relaxed);

        EngineStatus {
            model_loaded: model.is_some(),
            model_origin: model.as_ref().map(|m| m.origin.clone()),
            loaded_at: model.as_ref().map(|m| m.loaded_at),
            feature_names: model
                .as_ref()
                .map(|m| m.artifact.feature_names().to_vec())
                .unwrap_or_default(),
            n_trees: model.as_ref().map(|m| m.artifact.forest.n_trees()).unwrap_or(0),
            training: model.as_ref().map(|m| m.artifact.summary.clone()),
            inference_count: count,
            fallback_count: self.fallback_count.load(Ordering::Relaxed),
            avg_latency_us: if count > 0 { sum as f64 / count as f64 } else { 0.0 },
        }
    }
}

/// Bind features by the names recorded in the artifact, then run the forest
fn predict_with(model: &LoadedModel, features: &FeatureVector) -> Result<f64, PredictionError> {
    let names = model.artifact.feature_names();
    let row = features
        .ordered_by(names.iter().map(String::as_str))
        .map_err(PredictionError::UnknownFeature)?;

    if let Some((name, _)) = names.iter().zip(&row).find(|(_, v)| !v.is_finite()) {
        return Err(PredictionError::NonFiniteInput(name.clone()));
    }

    let probability = model
        .artifact
        .forest
        .predict_proba(&row)
        .map_err(|e| PredictionError::Model(e.to_string()))?;

    if !(0.0..=1.0).contains(&probability) {
        return Err(PredictionError::InvalidOutput(probability));
    }

    Ok(probability)
}
