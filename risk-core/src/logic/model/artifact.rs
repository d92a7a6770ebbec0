//! Model Artifact - persisted forest plus training metadata
//!
//! The artifact is replaced wholesale: it is written to a temporary file in
//! the target directory and renamed over the old one, so readers only ever
//! see a complete document.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::logic::features::{layout_hash, LayoutInfo, SourceSummary};
use crate::logic::label::{ClassBalance, LabelThresholds};
use super::forest::{ForestParams, RandomForest};
use super::metrics::ClassificationReport;

/// Bumped whenever the artifact document changes shape
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Default artifact location, relative to the working directory
pub const DEFAULT_MODEL_PATH: &str = "models/risk_model.json";

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("model artifact I/O at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("model artifact could not be serialized: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("model artifact at {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("model artifact at {path} is invalid: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

impl ArtifactError {
    fn io(path: &Path, source: io::Error) -> Self {
        ArtifactError::Io { path: path.to_path_buf(), source }
    }
}

/// How the fitted model was evaluated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Evaluation {
    /// Scored on rows withheld from fitting
    HeldOut {
        train_rows: usize,
        test_rows: usize,
        report: ClassificationReport,
    },
    /// Too few rows to hold any out; accuracy on the training rows
    Resubstitution { accuracy: f64 },
}

impl Evaluation {
    pub fn accuracy(&self) -> f64 {
        match self {
            Evaluation::HeldOut { report, .. } => report.accuracy,
            Evaluation::Resubstitution { accuracy } => *accuracy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub rows: usize,
    pub balance: ClassBalance,
    pub label_overrides: usize,
    pub thresholds: LabelThresholds,
    pub sources: Vec<SourceSummary>,
    pub evaluation: Evaluation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    /// Ordered names of the columns the forest was fitted on
    pub layout: LayoutInfo,
    pub params: ForestParams,
    pub summary: TrainingSummary,
    pub forest: RandomForest,
}

impl ModelArtifact {
    pub fn new(params: ForestParams, summary: TrainingSummary, forest: RandomForest) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            layout: LayoutInfo::current(),
            params,
            summary,
            forest,
        }
    }

    pub fn feature_names(&self) -> &[String] {
        &self.layout.feature_names
    }

    fn validate(&self) -> Result<(), String> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(format!(
                "format version {} (expected {})",
                self.format_version, ARTIFACT_FORMAT_VERSION
            ));
        }
        if self.layout.feature_names.is_empty() {
            return Err("no feature names".to_string());
        }
        if self.layout.feature_names.len() != self.forest.n_features() {
            return Err(format!(
                "{} feature names for a forest fitted on {} features",
                self.layout.feature_names.len(),
                self.forest.n_features()
            ));
        }
        self.forest.validate()
    }
}

/// Write the artifact atomically (temp file + rename)
pub fn save_artifact(artifact: &ModelArtifact, path: &Path) -> Result<(), ArtifactError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(|e| ArtifactError::io(&dir, e))?;

    let bytes = serde_json::to_vec_pretty(artifact).map_err(ArtifactError::Serialize)?;

    let tmp = NamedTempFile::new_in(&dir).map_err(|e| ArtifactError::io(&dir, e))?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        writer.write_all(&bytes).map_err(|e| ArtifactError::io(tmp.path(), e))?;
        writer.flush().map_err(|e| ArtifactError::io(tmp.path(), e))?;
    }
    tmp.as_file().sync_all().map_err(|e| ArtifactError::io(tmp.path(), e))?;

    tmp.persist(path).map_err(|e| ArtifactError::io(path, e.error))?;

    log::info!("Model artifact written to {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

/// Read and validate an artifact
pub fn load_artifact(path: &Path) -> Result<ModelArtifact, ArtifactError> {
    let data = fs::read(path).map_err(|e| ArtifactError::io(path, e))?;

    let artifact: ModelArtifact = serde_json::from_slice(&data).map_err(|source| {
        ArtifactError::Parse { path: path.to_path_buf(), source }
    })?;

    artifact.validate().map_err(|reason| ArtifactError::Invalid {
        path: path.to_path_buf(),
        reason,
    })?;

    if artifact.layout.hash != layout_hash() {
        log::warn!(
            "Model at {} was trained on feature layout v{} ({:08x}); features will be bound by name",
            path.display(),
            artifact.layout.version,
            artifact.layout.hash
        );
    }

    Ok(artifact)
}
