//! Candidate regression models
//!
//! Every candidate is a variant of [`Regressor`] so the trainer can hold a
//! uniform registry, score each one, and persist the winner as a single
//! serializable value.

pub mod decision_tree;
#[cfg(feature = "boosted")]
pub mod gradient_boosting;
pub mod linear;
pub mod metrics;
pub mod random_forest;

pub use decision_tree::DecisionTree;
#[cfg(feature = "boosted")]
pub use gradient_boosting::GradientBoosting;
pub use linear::LinearRegression;
pub use random_forest::RandomForest;

use crate::error::Result;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// A trainable regression model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Regressor {
    Linear(LinearRegression),
    Forest(RandomForest),
    #[cfg(feature = "boosted")]
    Boosted(GradientBoosting),
}

impl Regressor {
    pub fn name(&self) -> &'static str {
        match self {
            Regressor::Linear(_) => "LinearRegression",
            Regressor::Forest(_) => "RandomForest",
            #[cfg(feature = "boosted")]
            Regressor::Boosted(_) => "GradientBoosting",
        }
    }

    /// An untrained copy carrying the same hyperparameters.
    pub fn fresh(&self) -> Regressor {
        match self {
            Regressor::Linear(m) => {
                let mut new = LinearRegression::new();
                new.fit_intercept = m.fit_intercept;
                Regressor::Linear(new)
            }
            Regressor::Forest(m) => {
                let mut new = RandomForest::new(m.n_estimators)
                    .with_min_samples_leaf(m.min_samples_leaf)
                    .with_bootstrap(m.bootstrap)
                    .with_seed(m.seed);
                if let Some(depth) = m.max_depth {
                    new = new.with_max_depth(depth);
                }
                if let Some(k) = m.max_features {
                    new = new.with_max_features(k);
                }
                new.min_samples_split = m.min_samples_split;
                Regressor::Forest(new)
            }
            #[cfg(feature = "boosted")]
            Regressor::Boosted(m) => Regressor::Boosted(
                GradientBoosting::new(m.n_estimators)
                    .with_learning_rate(m.learning_rate)
                    .with_max_depth(m.max_depth)
                    .with_min_samples_leaf(m.min_samples_leaf)
                    .with_subsample(m.subsample)
                    .with_colsample(m.colsample)
                    .with_seed(m.seed),
            ),
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        match self {
            Regressor::Linear(m) => m.fit(x, y),
            Regressor::Forest(m) => m.fit(x, y),
            #[cfg(feature = "boosted")]
            Regressor::Boosted(m) => m.fit(x, y),
        }
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            Regressor::Linear(m) => m.predict(x),
            Regressor::Forest(m) => m.predict(x),
            #[cfg(feature = "boosted")]
            Regressor::Boosted(m) => m.predict(x),
        }
    }
}

/// The fixed candidate lineup evaluated by the trainer, in registration
/// order. Ties on score go to the earlier entry.
pub fn candidate_registry(seed: u64) -> Vec<Regressor> {
    #[cfg_attr(not(feature = "boosted"), allow(unused_mut))]
    let mut candidates = vec![
        Regressor::Linear(LinearRegression::new()),
        Regressor::Forest(RandomForest::new(200).with_seed(seed)),
    ];

    #[cfg(feature = "boosted")]
    candidates.push(Regressor::Boosted(
        GradientBoosting::new(300)
            .with_learning_rate(0.05)
            .with_max_depth(4)
            .with_subsample(0.9)
            .with_colsample(0.9)
            .with_seed(seed),
    ));

    #[cfg(not(feature = "boosted"))]
    tracing::warn!("boosted feature disabled; gradient boosting candidate skipped");

    candidates
}
