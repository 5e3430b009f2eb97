//! Prediction pipeline
//!
//! Loads the persisted preprocessor and model on first use and caches
//! them for the life of the pipeline. Not synchronized; wrap in a lock if
//! shared across threads.

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::models::Regressor;
use crate::preprocessing::Preprocessor;
use crate::{artifact, data};
use ndarray::Array1;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// One scoring request row matching the training schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamRecord {
    pub gender: String,
    pub race_ethnicity: String,
    pub parental_level_of_education: String,
    pub lunch: String,
    pub test_preparation_course: String,
    pub reading_score: f64,
    pub writing_score: f64,
}

pub struct PredictPipeline {
    config: PipelineConfig,
    preprocessor: Option<Preprocessor>,
    model: Option<Regressor>,
}

impl PredictPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            preprocessor: None,
            model: None,
        }
    }

    /// Predict targets for a feature DataFrame.
    pub fn predict(&mut self, features: &DataFrame) -> Result<Array1<f64>> {
        self.load_artifacts()?;

        // load_artifacts guarantees both are present
        let preprocessor = self.preprocessor.as_ref().ok_or(PipelineError::NotFitted)?;
        let model = self.model.as_ref().ok_or(PipelineError::NotFitted)?;

        let matrix = preprocessor.transform(features)?;
        model.predict(&matrix)
    }

    /// Predict targets for typed records.
    pub fn predict_records(&mut self, records: &[ExamRecord]) -> Result<Array1<f64>> {
        let df = Self::records_to_dataframe(records)?;
        self.predict(&df)
    }

    /// Predict targets for a CSV of feature rows.
    pub fn predict_csv(&mut self, path: &Path) -> Result<Array1<f64>> {
        let df = data::load_csv(path)?;
        self.predict(&df)
    }

    fn load_artifacts(&mut self) -> Result<()> {
        if self.preprocessor.is_none() {
            let path = &self.config.preprocessor_path;
            if !path.exists() {
                return Err(PipelineError::Inference(format!(
                    "preprocessor artifact not found at {}; run training first",
                    path.display()
                )));
            }
            self.preprocessor = Some(Preprocessor::load(path)?);
            info!(path = %path.display(), "preprocessor loaded");
        }

        if self.model.is_none() {
            let path = &self.config.model_path;
            if !path.exists() {
                return Err(PipelineError::Inference(format!(
                    "model artifact not found at {}; run training first",
                    path.display()
                )));
            }
            self.model = Some(artifact::load_json(path)?);
            info!(path = %path.display(), "model loaded");
        }

        Ok(())
    }

    fn records_to_dataframe(records: &[ExamRecord]) -> Result<DataFrame> {
        if records.is_empty() {
            return Err(PipelineError::Inference("no records to score".to_string()));
        }

        let col_str = |f: fn(&ExamRecord) -> &str, name: &str| {
            Column::new(
                name.into(),
                records.iter().map(f).collect::<Vec<&str>>(),
            )
        };

        DataFrame::new(vec![
            col_str(|r| r.gender.as_str(), "gender"),
            col_str(|r| r.race_ethnicity.as_str(), "race_ethnicity"),
            col_str(
                |r| r.parental_level_of_education.as_str(),
                "parental_level_of_education",
            ),
            col_str(|r| r.lunch.as_str(), "lunch"),
            col_str(
                |r| r.test_preparation_course.as_str(),
                "test_preparation_course",
            ),
            Column::new(
                "reading_score".into(),
                records.iter().map(|r| r.reading_score).collect::<Vec<f64>>(),
            ),
            Column::new(
                "writing_score".into(),
                records.iter().map(|r| r.writing_score).collect::<Vec<f64>>(),
            ),
        ])
        .map_err(|e| PipelineError::Inference(e.to_string()))
    }
}
