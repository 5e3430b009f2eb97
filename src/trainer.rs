//! Model training and selection stage
//!
//! Fits every candidate in the registry, scores each on the held-out
//! split, and persists the best one. Selection is strictly-greater, so a
//! score tie keeps the earlier-registered candidate.

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::models::{self, metrics};
use crate::{artifact, transformation::TransformedData};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// Scoring function over (y_true, y_pred); higher is better.
pub type Scorer = fn(&Array1<f64>, &Array1<f64>) -> f64;

/// Outcome of a training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Per-candidate test scores, in registry order.
    pub scores: Vec<(String, f64)>,
    pub best_model: String,
    pub best_score: f64,
    pub model_path: PathBuf,
    pub preprocessor_path: Option<PathBuf>,
}

pub struct ModelTrainer {
    config: PipelineConfig,
    scorer: Scorer,
}

impl ModelTrainer {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            scorer: metrics::r2_score,
        }
    }

    /// Swap the selection metric. The scorer must be higher-is-better.
    pub fn with_scorer(mut self, scorer: Scorer) -> Self {
        self.scorer = scorer;
        self
    }

    /// Train all candidates, pick the best by test score, refit it, and
    /// save it to the configured model path.
    pub fn run(&self, data: &TransformedData) -> Result<TrainingReport> {
        let candidates = models::candidate_registry(self.config.split_seed);
        info!(n_candidates = candidates.len(), "starting model training");

        let mut scores: Vec<(String, f64)> = Vec::with_capacity(candidates.len());
        let mut best: Option<(usize, f64)> = None;

        for (idx, candidate) in candidates.iter().enumerate() {
            let mut model = candidate.fresh();
            model.fit(&data.x_train, &data.y_train)?;
            let predictions = model.predict(&data.x_test)?;
            let score = (self.scorer)(&data.y_test, &predictions);

            info!(model = model.name(), score, "candidate evaluated");
            scores.push((model.name().to_string(), score));

            // Strictly greater keeps the first candidate on ties
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((idx, score));
            }
        }

        let (best_idx, best_score) =
            best.ok_or_else(|| PipelineError::Training("no candidate models".to_string()))?;

        let mut winner = candidates[best_idx].fresh();
        winner.fit(&data.x_train, &data.y_train)?;
        artifact::save_json(&self.config.model_path, &winner)?;

        info!(
            best_model = winner.name(),
            best_score,
            path = %self.config.model_path.display(),
            "training complete"
        );

        Ok(TrainingReport {
            scores,
            best_model: winner.name().to_string(),
            best_score,
            model_path: self.config.model_path.clone(),
            preprocessor_path: None,
        })
    }
}
