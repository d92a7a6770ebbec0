//! CART Decision Tree (binary classification, Gini impurity)
//!
//! Nodes live in a flat vector; children are addressed by index so the tree
//! serializes as plain data. Samples with `x[feature] <= threshold` go left.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Leaf {
        /// Fraction of class-1 samples that reached this leaf
        probability: f64,
        samples: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Growth limits for a single tree
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Non-constant features examined per split
    pub max_features: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

struct Candidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

fn gini(positives: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let p = positives as f64 / total as f64;
    1.0 - p * p - (1.0 - p) * (1.0 - p)
}

impl DecisionTree {
    /// Grow a tree on the rows named by `sample` (duplicates allowed, as
    /// produced by bootstrap sampling).
    pub fn fit<R: Rng>(
        x: &[Vec<f64>],
        y: &[u8],
        sample: &[usize],
        params: &TreeParams,
        rng: &mut R,
    ) -> Self {
        let mut nodes = vec![Node::Leaf { probability: 0.0, samples: 0 }];
        let mut stack: Vec<(usize, Vec<usize>, usize)> = vec![(0, sample.to_vec(), 0)];

        while let Some((id, rows, depth)) = stack.pop() {
            let total = rows.len();
            let positives = rows.iter().filter(|&&i| y[i] == 1).count();
            let leaf = Node::Leaf {
                probability: if total == 0 { 0.0 } else { positives as f64 / total as f64 },
                samples: total,
            };

            let pure = positives == 0 || positives == total;
            let too_deep = params.max_depth.is_some_and(|d| depth >= d);
            if pure || total < params.min_samples_split || too_deep {
                nodes[id] = leaf;
                continue;
            }

            let Some(best) = best_split(x, y, &rows, positives, params.max_features, rng) else {
                nodes[id] = leaf;
                continue;
            };

            let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
                .iter()
                .partition(|&&i| x[i][best.feature] <= best.threshold);

            let left = nodes.len();
            let right = left + 1;
            nodes.push(Node::Leaf { probability: 0.0, samples: 0 });
            nodes.push(Node::Leaf { probability: 0.0, samples: 0 });
            nodes[id] = Node::Split {
                feature: best.feature,
                threshold: best.threshold,
                left,
                right,
            };

            stack.push((right, right_rows, depth + 1));
            stack.push((left, left_rows, depth + 1));
        }

        Self { nodes }
    }

    /// Class-1 probability of the leaf `row` lands in
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Leaf { probability, .. } => return *probability,
                Node::Split { feature, threshold, left, right } => {
                    id = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let Node::Split { left, right, .. } = self.nodes[id] {
                stack.push((left, depth + 1));
                stack.push((right, depth + 1));
            }
        }
        max_depth
    }

    /// Structural check for trees read back from disk
    pub(crate) fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        for (id, node) in self.nodes.iter().enumerate() {
            match *node {
                Node::Leaf { probability, .. } => {
                    if !(0.0..=1.0).contains(&probability) {
                        return Err(format!("node {} has probability {}", id, probability));
                    }
                }
                Node::Split { feature, threshold, left, right } => {
                    if feature >= n_features {
                        return Err(format!("node {} splits on feature {} of {}", id, feature, n_features));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {} has threshold {}", id, threshold));
                    }
                    // Children are always appended after their parent
                    if left <= id || right <= id || left >= self.nodes.len() || right >= self.nodes.len() {
                        return Err(format!("node {} has invalid children {}/{}", id, left, right));
                    }
                }
            }
        }

        Ok(())
    }
}

fn best_split<R: Rng>(
    x: &[Vec<f64>],
    y: &[u8],
    rows: &[usize],
    positives: usize,
    max_features: usize,
    rng: &mut R,
) -> Option<Candidate> {
    let n_features = x.first().map(Vec::len).unwrap_or(0);
    let mut features: Vec<usize> = (0..n_features).collect();
    features.shuffle(rng);

    let total = rows.len();
    let mut sorted = rows.to_vec();
    let mut best: Option<Candidate> = None;
    let mut visited = 0;

    for feature in features {
        if visited >= max_features {
            break;
        }

        sorted.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));
        let lowest = x[sorted[0]][feature];
        let highest = x[sorted[total - 1]][feature];
        if lowest == highest {
            // Constant features do not count against max_features
            continue;
        }
        visited += 1;

        let mut left_total = 0;
        let mut left_pos = 0;

        for k in 0..total - 1 {
            let i = sorted[k];
            left_total += 1;
            left_pos += usize::from(y[i]);

            let value = x[i][feature];
            let next = x[sorted[k + 1]][feature];
            if value == next {
                continue;
            }

            let right_total = total - left_total;
            let right_pos = positives - left_pos;
            let impurity = (left_total as f64 * gini(left_pos, left_total)
                + right_total as f64 * gini(right_pos, right_total))
                / total as f64;

            if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                let mut threshold = value / 2.0 + next / 2.0;
                if threshold >= next || !threshold.is_finite() {
                    threshold = value;
                }
                best = Some(Candidate { feature, threshold, impurity });
            }
        }
    }

    best
}
