//! Training pipeline: label, split, fit, evaluate, persist

use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use thiserror::Error;

use crate::logic::features::{FeatureError, FeatureTable, FEATURE_LAYOUT};
use crate::logic::label::{label_table, ClassBalance, LabelThresholds};
use crate::logic::model::{
    save_artifact, ArtifactError, ClassificationReport, Evaluation, ForestError, ForestParams,
    ModelArtifact, RandomForest, TrainingSummary, DEFAULT_MODEL_PATH,
};

#[derive(Debug, Error)]
pub enum TrainError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("data error: {0}")]
    Data(String),

    #[error(transparent)]
    Io(#[from] ArtifactError),
}

impl From<FeatureError> for TrainError {
    fn from(e: FeatureError) -> Self {
        match e {
            FeatureError::Configuration(msg) => TrainError::Configuration(msg),
            other => TrainError::Data(other.to_string()),
        }
    }
}

impl From<ForestError> for TrainError {
    fn from(e: ForestError) -> Self {
        TrainError::Data(e.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct TrainerConfig {
    /// Fraction of rows held out for evaluation
    pub test_ratio: f64,
    /// Below this many rows everything is used for fitting
    pub min_holdout_rows: usize,
    pub forest: ForestParams,
    pub model_path: PathBuf,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            test_ratio: 0.2,
            min_holdout_rows: 5,
            forest: ForestParams::default(),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
        }
    }
}

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub artifact: ModelArtifact,
    pub path: PathBuf,
}

pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Fit and evaluate without touching the filesystem
    pub fn train(
        &self,
        table: &FeatureTable,
        thresholds: &LabelThresholds,
    ) -> Result<ModelArtifact, TrainError> {
        if table.is_empty() {
            return Err(TrainError::Data("feature table is empty".to_string()));
        }
        if !(0.0..1.0).contains(&self.config.test_ratio) {
            return Err(TrainError::Configuration(format!(
                "test ratio {} is outside [0, 1)",
                self.config.test_ratio
            )));
        }
        if self.config.forest.n_trees == 0 {
            return Err(TrainError::Configuration("tree count must be at least 1".to_string()));
        }

        let x: Vec<Vec<f64>> = table.rows.iter().map(|r| r.features.as_array().to_vec()).collect();
        let y = label_table(table, thresholds);
        let balance = ClassBalance::from_labels(&y);

        log::info!("Total training rows: {}", table.len());
        log::info!("  - safe (0): {}", balance.safe);
        log::info!("  - at risk (1): {}", balance.at_risk);
        if balance.safe == 0 || balance.at_risk == 0 {
            log::warn!("Only one class present; the model will predict it for every record");
        }

        let params = self.config.forest;
        let (forest, evaluation) = match self.split(table.len()) {
            Some((train_idx, test_idx)) => {
                let pick = |idx: &[usize]| -> (Vec<Vec<f64>>, Vec<u8>) {
                    idx.iter().map(|&i| (x[i].clone(), y[i])).unzip()
                };
                let (x_train, y_train) = pick(&train_idx);
                let (x_test, y_test) = pick(&test_idx);

                let forest = RandomForest::fit(&x_train, &y_train, &params)?;
                let predictions = predict_all(&forest, &x_test)?;
                let report = ClassificationReport::compute(&predictions, &y_test)?;

                log::info!(
                    "Held-out accuracy: {:.1}% ({} train / {} test)",
                    report.accuracy * 100.0,
                    x_train.len(),
                    x_test.len()
                );
                log::info!("Classification report:\n{}", report);

                let evaluation = Evaluation::HeldOut {
                    train_rows: x_train.len(),
                    test_rows: x_test.len(),
                    report,
                };
                (forest, evaluation)
            }
            None => {
                let forest = RandomForest::fit(&x, &y, &params)?;
                let predictions = predict_all(&forest, &x)?;
                let accuracy = ClassificationReport::compute(&predictions, &y)?.accuracy;
                log::info!(
                    "Only {} rows; fitted on all of them. Training accuracy: {:.1}%",
                    x.len(),
                    accuracy * 100.0
                );
                (forest, Evaluation::Resubstitution { accuracy })
            }
        };

        let summary = TrainingSummary {
            rows: table.len(),
            balance,
            label_overrides: table.overrides(),
            thresholds: *thresholds,
            sources: table.sources.clone(),
            evaluation,
        };

        Ok(ModelArtifact::new(params, summary, forest))
    }

    /// Train, then persist the artifact atomically
    pub fn run(
        &self,
        table: &FeatureTable,
        thresholds: &LabelThresholds,
    ) -> Result<TrainingOutcome, TrainError> {
        let artifact = self.train(table, thresholds)?;
        save_artifact(&artifact, &self.config.model_path)?;
        Ok(TrainingOutcome {
            artifact,
            path: self.config.model_path.clone(),
        })
    }

    /// Shuffled train/test indices, or `None` when there are too few rows
    fn split(&self, n: usize) -> Option<(Vec<usize>, Vec<usize>)> {
        if n < self.config.min_holdout_rows.max(2) || self.config.test_ratio <= 0.0 {
            return None;
        }

        let mut idx: Vec<usize> = (0..n).collect();
        idx.shuffle(&mut StdRng::seed_from_u64(self.config.forest.seed));

        let n_test = ((n as f64) * self.config.test_ratio).ceil() as usize;
        let n_test = n_test.clamp(1, n - 1);
        let test = idx.split_off(n - n_test);
        Some((idx, test))
    }
}

fn predict_all(forest: &RandomForest, rows: &[Vec<f64>]) -> Result<Vec<u8>, ForestError> {
    debug_assert_eq!(forest.n_features(), FEATURE_LAYOUT.len());
    rows.iter().map(|r| forest.predict(r)).collect()
}
