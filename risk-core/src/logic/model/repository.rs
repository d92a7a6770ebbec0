//! Model Repository - owns the currently loaded model
//!
//! Constructed once at process start and handed to the predictor. Readers
//! clone an `Arc`; a reload swaps the pointer, so in-flight predictions keep
//! the model they started with.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::artifact::{load_artifact, ModelArtifact};

/// A model ready for inference
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub artifact: ModelArtifact,
    /// Where it came from (file path or "memory")
    pub origin: String,
    pub loaded_at: DateTime<Utc>,
}

impl LoadedModel {
    pub fn new(artifact: ModelArtifact, origin: impl Into<String>) -> Self {
        Self {
            artifact,
            origin: origin.into(),
            loaded_at: Utc::now(),
        }
    }
}

pub trait ModelRepository: Send + Sync {
    /// (Re)load from backing storage. `None` when nothing usable was found.
    fn load(&self) -> Option<Arc<LoadedModel>>;

    /// The model currently in use, if any
    fn current(&self) -> Option<Arc<LoadedModel>>;
}

/// Repository backed by an artifact file at a well-known path
pub struct FileModelRepository {
    path: PathBuf,
    current: RwLock<Option<Arc<LoadedModel>>>,
}

impl FileModelRepository {
    /// Create an empty repository; call [`ModelRepository::load`] to read the file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            current: RwLock::new(None),
        }
    }

    /// Create and attempt an initial load
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let repo = Self::new(path);
        if repo.load().is_none() {
            log::warn!(
                "No usable model at {} - predictions will use the neutral fallback. Run risk-train first.",
                repo.path.display()
            );
        }
        repo
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ModelRepository for FileModelRepository {
    fn load(&self) -> Option<Arc<LoadedModel>> {
        if !self.path.exists() {
            log::info!("Model artifact {} not found", self.path.display());
            return None;
        }

        match load_artifact(&self.path) {
            Ok(artifact) => {
                let model = Arc::new(LoadedModel::new(artifact, self.path.display().to_string()));
                log::info!(
                    "Loaded model from {} ({} trees, {} features)",
                    model.origin,
                    model.artifact.forest.n_trees(),
                    model.artifact.forest.n_features()
                );
                *self.current.write() = Some(model.clone());
                Some(model)
            }
            Err(e) => {
                // Keep serving whatever was loaded before
                log::error!("Failed to load model: {}", e);
                None
            }
        }
    }

    fn current(&self) -> Option<Arc<LoadedModel>> {
        self.current.read().clone()
    }
}

/// Fixed in-memory model, mainly for embedding and tests
pub struct InMemoryModelRepository {
    model: Option<Arc<LoadedModel>>,
}

impl InMemoryModelRepository {
    pub fn empty() -> Self {
        Self { model: None }
    }

    pub fn with_artifact(artifact: ModelArtifact) -> Self {
        Self {
            model: Some(Arc::new(LoadedModel::new(artifact, "memory"))),
        }
    }
}

impl ModelRepository for InMemoryModelRepository {
    fn load(&self) -> Option<Arc<LoadedModel>> {
        self.model.clone()
    }

    fn current(&self) -> Option<Arc<LoadedModel>> {
        self.model.clone()
    }
}
