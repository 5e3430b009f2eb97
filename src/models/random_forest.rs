//! Random forest regressor
//!
//! Bagged ensemble of [`DecisionTree`]s trained in parallel with rayon.
//! Each tree gets a deterministic seed derived from the forest seed, so
//! results are reproducible regardless of thread scheduling.

use crate::error::{PipelineError, Result};
use crate::models::decision_tree::DecisionTree;
use ndarray::{Array1, Array2, Axis};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features sampled per split; `None` uses all features.
    pub max_features: Option<usize>,
    pub bootstrap: bool,
    pub seed: u64,
}

impl RandomForest {
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: 0,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
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

    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
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
        if self.n_estimators == 0 {
            return Err(PipelineError::Training(
                "n_estimators must be at least 1".to_string(),
            ));
        }

        let base_seed = self.seed;
        self.trees = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let tree_seed = base_seed.wrapping_add(tree_idx as u64);
                let (x_boot, y_boot) = if self.bootstrap {
                    let mut rng = ChaCha8Rng::seed_from_u64(tree_seed);
                    let sample: Vec<usize> =
                        (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();
                    let x_boot = x.select(Axis(0), &sample);
                    let y_boot = Array1::from_iter(sample.iter().map(|&i| y[i]));
                    (x_boot, y_boot)
                } else {
                    (x.clone(), y.clone())
                };

                let mut tree = DecisionTree::new()
                    .with_min_samples_split(self.min_samples_split)
                    .with_min_samples_leaf(self.min_samples_leaf)
                    .with_seed(tree_seed);
                if let Some(depth) = self.max_depth {
                    tree = tree.with_max_depth(depth);
                }
                if let Some(k) = self.max_features {
                    tree = tree.with_max_features(k);
                }
                tree.fit(&x_boot, &y_boot)?;
                Ok(tree)
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(n_trees = self.trees.len(), "random forest fitted");
        Ok(())
    }

    /// Mean of the per-tree predictions.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(PipelineError::NotFitted);
        }

        let mut total: Array1<f64> = Array1::zeros(x.nrows());
        for tree in &self.trees {
            total = total + tree.predict(x)?;
        }
        Ok(total / self.trees.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::metrics::r2_score;
    use ndarray::array;

    fn training_data() -> (Array2<f64>, Array1<f64>) {
        // y = 2 * x0 + noise-free
        let rows = 40;
        let mut x = Array2::zeros((rows, 2));
        let mut y = Array1::zeros(rows);
        for i in 0..rows {
            let v = i as f64;
            x[[i, 0]] = v;
            x[[i, 1]] = (v * 7.0) % 11.0;
            y[i] = 2.0 * v;
        }
        (x, y)
    }

    #[test]
    fn test_fits_training_data_well() {
        let (x, y) = training_data();
        let mut forest = RandomForest::new(25).with_seed(42);
        forest.fit(&x, &y).unwrap();

        let pred = forest.predict(&x).unwrap();
        assert!(r2_score(&y, &pred) > 0.9);
    }

    #[test]
    fn test_deterministic_with_same_seed() {
        let (x, y) = training_data();

        let mut a = RandomForest::new(10).with_seed(7);
        a.fit(&x, &y).unwrap();
        let mut b = RandomForest::new(10).with_seed(7);
        b.fit(&x, &y).unwrap();

        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn test_different_seeds_differ() {
        let (x, y) = training_data();

        let mut a = RandomForest::new(10).with_seed(1);
        a.fit(&x, &y).unwrap();
        let mut b = RandomForest::new(10).with_seed(2);
        b.fit(&x, &y).unwrap();

        assert_ne!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn test_predict_before_fit_errors() {
        let forest = RandomForest::new(5);
        assert!(matches!(
            forest.predict(&array![[1.0, 2.0]]),
            Err(PipelineError::NotFitted)
        ));
    }

    #[test]
    fn test_zero_estimators_rejected() {
        let (x, y) = training_data();
        let mut forest = RandomForest::new(0);
        assert!(forest.fit(&x, &y).is_err());
    }
}
