//! Random Forest - bagged ensemble of CART trees
//!
//! Each tree is grown on a bootstrap sample with a random subset of
//! candidate features per split. The class-1 probability is the mean of the
//! per-tree leaf probabilities. A single seeded RNG drives all sampling, so
//! the same data and seed always produce the same forest.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::tree::{DecisionTree, TreeParams};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ForestError {
    #[error("cannot fit on an empty table")]
    EmptyInput,

    #[error("{rows} feature rows but {labels} labels")]
    LabelMismatch { rows: usize, labels: usize },

    #[error("row {row} has {got} features, expected {expected}")]
    RaggedRow { row: usize, expected: usize, got: usize },

    #[error("input has {got} features, model expects {expected}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("label {0} is not 0 or 1")]
    InvalidLabel(u8),

    #[error("a forest needs at least one tree")]
    NoTrees,
}

/// How many features to consider at each split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    Sqrt,
    All,
    Fixed(usize),
}

impl MaxFeatures {
    pub fn resolve(&self, n_features: usize) -> usize {
        let n = match self {
            MaxFeatures::Sqrt => (n_features as f64).sqrt() as usize,
            MaxFeatures::All => n_features,
            MaxFeatures::Fixed(k) => (*k).min(n_features),
        };
        n.max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub max_features: MaxFeatures,
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn fit(x: &[Vec<f64>], y: &[u8], params: &ForestParams) -> Result<Self, ForestError> {
        if x.is_empty() {
            return Err(ForestError::EmptyInput);
        }
        if params.n_trees == 0 {
            return Err(ForestError::NoTrees);
        }
        if x.len() != y.len() {
            return Err(ForestError::LabelMismatch { rows: x.len(), labels: y.len() });
        }
        if let Some(&bad) = y.iter().find(|&&l| l > 1) {
            return Err(ForestError::InvalidLabel(bad));
        }

        let n_features = x[0].len();
        if let Some((row, r)) = x.iter().enumerate().find(|(_, r)| r.len() != n_features) {
            return Err(ForestError::RaggedRow { row, expected: n_features, got: r.len() });
        }

        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split.max(2),
            max_features: params.max_features.resolve(n_features),
        };

        let n = x.len();
        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut trees = Vec::with_capacity(params.n_trees);

        for _ in 0..params.n_trees {
            let sample: Vec<usize> = if params.bootstrap {
                (0..n).map(|_| rng.gen_range(0..n)).collect()
            } else {
                (0..n).collect()
            };
            trees.push(DecisionTree::fit(x, y, &sample, &tree_params, &mut rng));
        }

        Ok(Self { n_features, trees })
    }

    /// Mean class-1 probability across trees
    pub fn predict_proba(&self, row: &[f64]) -> Result<f64, ForestError> {
        if row.len() != self.n_features {
            return Err(ForestError::ShapeMismatch { expected: self.n_features, got: row.len() });
        }

        let sum: f64 = self.trees.iter().map(|t| t.predict_proba(row)).sum();
        Ok(sum / self.trees.len() as f64)
    }

    /// Hard class at the 0.5 cut
    pub fn predict(&self, row: &[f64]) -> Result<u8, ForestError> {
        Ok(u8::from(self.predict_proba(row)? > 0.5))
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features).map_err(|e| format!("tree {}: {}", i, e))?;
        }
        Ok(())
    }
}
