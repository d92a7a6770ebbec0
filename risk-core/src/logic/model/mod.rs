//! Model Module - Risk classifier
//!
//! A bagged forest of CART trees, the artifact it is persisted in, the
//! repository that owns the loaded model, and the predictor that scores
//! records at request time.

pub mod tree;
pub mod forest;
pub mod metrics;
pub mod artifact;
pub mod repository;
pub mod inference;


// Re-export common types
pub use forest::{ForestError, ForestParams, MaxFeatures, RandomForest};
pub use metrics::ClassificationReport;
pub use artifact::{
    load_artifact, save_artifact, ArtifactError, Evaluation, ModelArtifact, TrainingSummary,
    DEFAULT_MODEL_PATH,
};
pub use repository::{FileModelRepository, InMemoryModelRepository, LoadedModel, ModelRepository};
pub use inference::{
    EngineStatus, FallbackPolicy, PredictionError, RiskPredictor, RiskScore, NEUTRAL_PROBABILITY,
};
