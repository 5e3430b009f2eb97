//! Regression decision tree
//!
//! Variance-reduction splits found with a single sorted sweep per feature.
//! Used directly and as the base learner for the ensemble models.

use crate::error::{PipelineError, Result};
use ndarray::{Array1, Array2};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        value: f64,
        n_samples: usize,
    },
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

/// Regression tree with mean-value leaves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Option<TreeNode>,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Number of features considered per split; `None` means all.
    pub max_features: Option<usize>,
    pub seed: u64,
}

impl DecisionTree {
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 0,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(PipelineError::Shape {
                expected: format!("y length = {n_samples}"),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(PipelineError::Training("empty training set".to_string()));
        }

        let indices: Vec<usize> = (0..n_samples).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.root = Some(self.build_node(x, y, &indices, 0, &mut rng));
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or(PipelineError::NotFitted)?;

        let predictions: Vec<f64> = (0..x.nrows())
            .map(|i| Self::predict_row(root, &x.row(i).to_vec()))
            .collect();
        Ok(Array1::from_vec(predictions))
    }

    fn build_node(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let n = indices.len();
        let mean = indices.iter().map(|&i| y[i]).sum::<f64>() / n as f64;

        let at_depth_limit = self.max_depth.is_some_and(|d| depth >= d);
        if n < self.min_samples_split || at_depth_limit || Self::is_pure(y, indices) {
            return TreeNode::Leaf {
                value: mean,
                n_samples: n,
            };
        }

        let Some((feature_idx, threshold)) = self.find_best_split(x, y, indices, rng) else {
            return TreeNode::Leaf {
                value: mean,
                n_samples: n,
            };
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[[i, feature_idx]] <= threshold);

        if left_indices.len() < self.min_samples_leaf
            || right_indices.len() < self.min_samples_leaf
        {
            return TreeNode::Leaf {
                value: mean,
                n_samples: n,
            };
        }

        let left = Box::new(self.build_node(x, y, &left_indices, depth + 1, rng));
        let right = Box::new(self.build_node(x, y, &right_indices, depth + 1, rng));

        TreeNode::Split {
            feature_idx,
            threshold,
            left,
            right,
        }
    }

    /// Best (feature, threshold) by variance reduction, scanning each
    /// candidate feature with one sorted sweep and running sums.
    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        rng: &mut ChaCha8Rng,
    ) -> Option<(usize, f64)> {
        let n = indices.len() as f64;
        let total_sum: f64 = indices.iter().map(|&i| y[i]).sum();
        let total_sq: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();
        let parent_var = total_sq / n - (total_sum / n).powi(2);
        if parent_var <= 0.0 {
            return None;
        }

        let candidates = self.candidate_features(x.ncols(), rng);

        let mut best: Option<(usize, f64, f64)> = None; // (feature, threshold, gain)
        for feature_idx in candidates {
            let mut order: Vec<usize> = indices.to_vec();
            order.sort_by(|&a, &b| {
                x[[a, feature_idx]]
                    .partial_cmp(&x[[b, feature_idx]])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let mut left_count = 0usize;
            let mut left_sum = 0.0;
            let mut left_sq = 0.0;

            for w in 1..order.len() {
                let moved = order[w - 1];
                left_count += 1;
                left_sum += y[moved];
                left_sq += y[moved] * y[moved];

                let lo = x[[moved, feature_idx]];
                let hi = x[[order[w], feature_idx]];
                if lo == hi {
                    continue;
                }

                let right_count = order.len() - left_count;
                if left_count < self.min_samples_leaf || right_count < self.min_samples_leaf {
                    continue;
                }

                let ln = left_count as f64;
                let rn = right_count as f64;
                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let left_var = left_sq / ln - (left_sum / ln).powi(2);
                let right_var = right_sq / rn - (right_sum / rn).powi(2);
                let weighted = (ln * left_var + rn * right_var) / n;

                let gain = parent_var - weighted;
                if gain > best.map_or(0.0, |(_, _, g)| g) {
                    best = Some((feature_idx, (lo + hi) / 2.0, gain));
                }
            }
        }

        best.map(|(f, t, _)| (f, t))
    }

    fn candidate_features(&self, n_features: usize, rng: &mut ChaCha8Rng) -> Vec<usize> {
        let mut features: Vec<usize> = (0..n_features).collect();
        match self.max_features {
            Some(k) if k < n_features => {
                features.shuffle(rng);
                features.truncate(k.max(1));
                features
            }
            _ => features,
        }
    }

    fn is_pure(y: &Array1<f64>, indices: &[usize]) -> bool {
        let first = y[indices[0]];
        indices.iter().all(|&i| (y[i] - first).abs() < 1e-10)
    }

    fn predict_row(node: &TreeNode, row: &[f64]) -> f64 {
        match node {
            TreeNode::Leaf { value, .. } => *value,
            TreeNode::Split {
                feature_idx,
                threshold,
                left,
                right,
            } => {
                if row[*feature_idx] <= *threshold {
                    Self::predict_row(left, row)
                } else {
                    Self::predict_row(right, row)
                }
            }
        }
    }

    pub fn depth(&self) -> usize {
        fn node_depth(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => 1 + node_depth(left).max(node_depth(right)),
            }
        }
        self.root.as_ref().map_or(0, node_depth)
    }
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new()
    }
}
