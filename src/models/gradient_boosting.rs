//! Gradient boosted trees for regression
//!
//! Squared-error boosting: each stage fits a shallow tree to the current
//! residuals, with optional row and column subsampling per stage. Stages
//! are inherently sequential, so no rayon here.

use crate::error::{PipelineError, Result};
use crate::models::decision_tree::DecisionTree;
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One boosting stage: a tree plus the feature subset it was trained on.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BoostStage {
    tree: DecisionTree,
    features: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoosting {
    stages: Vec<BoostStage>,
    init_value: f64,
    is_fitted: bool,
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    /// Fraction of rows drawn (without replacement) per stage.
    pub subsample: f64,
    /// Fraction of columns drawn per stage.
    pub colsample: f64,
    pub seed: u64,
}

impl GradientBoosting {
    pub fn new(n_estimators: usize) -> Self {
        Self {
            stages: Vec::new(),
            init_value: 0.0,
            is_fitted: false,
            n_estimators,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_leaf: 1,
            subsample: 1.0,
            colsample: 1.0,
            seed: 0,
        }
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    pub fn with_subsample(mut self, fraction: f64) -> Self {
        self.subsample = fraction;
        self
    }

    pub fn with_colsample(mut self, fraction: f64) -> Self {
        self.colsample = fraction;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        let n_features = x.ncols();
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
        if !(0.0..=1.0).contains(&self.subsample)
            || !(0.0..=1.0).contains(&self.colsample)
            || self.subsample == 0.0
            || self.colsample == 0.0
        {
            return Err(PipelineError::Training(format!(
                "subsample fractions must be in (0, 1], got subsample={} colsample={}",
                self.subsample, self.colsample
            )));
        }

        self.init_value = y.sum() / n_samples as f64;
        self.stages = Vec::with_capacity(self.n_estimators);

        let mut predictions = Array1::from_elem(n_samples, self.init_value);
        let n_rows_stage = ((self.subsample * n_samples as f64).floor() as usize).max(1);
        let n_cols_stage = ((self.colsample * n_features as f64).round() as usize)
            .clamp(1, n_features);

        for stage_idx in 0..self.n_estimators {
            let mut rng = ChaCha8Rng::seed_from_u64(self.seed.wrapping_add(stage_idx as u64));

            let residuals: Array1<f64> = y - &predictions;

            let mut row_pool: Vec<usize> = (0..n_samples).collect();
            let rows = if n_rows_stage < n_samples {
                row_pool.shuffle(&mut rng);
                row_pool.truncate(n_rows_stage);
                row_pool
            } else {
                row_pool
            };

            let mut col_pool: Vec<usize> = (0..n_features).collect();
            let mut features = if n_cols_stage < n_features {
                col_pool.shuffle(&mut rng);
                col_pool.truncate(n_cols_stage);
                col_pool
            } else {
                col_pool
            };
            features.sort_unstable();

            let x_stage = x.select(Axis(0), &rows).select(Axis(1), &features);
            let r_stage = Array1::from_iter(rows.iter().map(|&i| residuals[i]));

            let mut tree = DecisionTree::new()
                .with_max_depth(self.max_depth)
                .with_min_samples_leaf(self.min_samples_leaf)
                .with_seed(self.seed.wrapping_add(stage_idx as u64));
            tree.fit(&x_stage, &r_stage)?;

            // Update running predictions on the full training set
            let x_full = x.select(Axis(1), &features);
            let stage_pred = tree.predict(&x_full)?;
            predictions = predictions + stage_pred * self.learning_rate;

            self.stages.push(BoostStage { tree, features });
        }

        self.is_fitted = true;
        debug!(
            n_stages = self.stages.len(),
            learning_rate = self.learning_rate,
            "gradient boosting fitted"
        );
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(PipelineError::NotFitted);
        }

        let mut predictions = Array1::from_elem(x.nrows(), self.init_value);
        for stage in &self.stages {
            let x_sub = x.select(Axis(1), &stage.features);
            predictions = predictions + stage.tree.predict(&x_sub)? * self.learning_rate;
        }
        Ok(predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::metrics::r2_score;
    use ndarray::array;

    fn training_data() -> (Array2<f64>, Array1<f64>) {
        let rows = 50;
        let mut x = Array2::zeros((rows, 3));
        let mut y = Array1::zeros(rows);
        for i in 0..rows {
            let v = i as f64;
            x[[i, 0]] = v;
            x[[i, 1]] = (v * 3.0) % 13.0;
            x[[i, 2]] = (v / 2.0).sin();
            y[i] = 1.5 * v + x[[i, 1]];
        }
        (x, y)
    }

    #[test]
    fn test_boosting_improves_over_mean() {
        let (x, y) = training_data();
        let mut model = GradientBoosting::new(50)
            .with_learning_rate(0.2)
            .with_max_depth(3)
            .with_seed(42);
        model.fit(&x, &y).unwrap();

        let pred = model.predict(&x).unwrap();
        assert!(r2_score(&y, &pred) > 0.9);
    }

    #[test]
    fn test_subsampling_still_learns() {
        let (x, y) = training_data();
        let mut model = GradientBoosting::new(80)
            .with_learning_rate(0.2)
            .with_max_depth(3)
            .with_subsample(0.9)
            .with_colsample(0.9)
            .with_seed(42);
        model.fit(&x, &y).unwrap();

        let pred = model.predict(&x).unwrap();
        assert!(r2_score(&y, &pred) > 0.8);
    }

    #[test]
    fn test_deterministic_with_same_seed() {
        let (x, y) = training_data();

        let mut a = GradientBoosting::new(20).with_subsample(0.8).with_seed(5);
        a.fit(&x, &y).unwrap();
        let mut b = GradientBoosting::new(20).with_subsample(0.8).with_seed(5);
        b.fit(&x, &y).unwrap();

        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn test_predict_before_fit_errors() {
        let model = GradientBoosting::new(10);
        assert!(matches!(
            model.predict(&array![[1.0, 2.0, 3.0]]),
            Err(PipelineError::NotFitted)
        ));
    }

    #[test]
    fn test_invalid_subsample_rejected() {
        let (x, y) = training_data();
        let mut model = GradientBoosting::new(10).with_subsample(0.0);
        assert!(model.fit(&x, &y).is_err());
    }
}
