//! Training pipeline orchestration

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::ingestion::DataIngestion;
use crate::trainer::{ModelTrainer, TrainingReport};
use crate::transformation::DataTransformation;
use tracing::info;

/// Run the full training pipeline with configuration from the environment.
pub fn run_training_pipeline() -> Result<TrainingReport> {
    run_with_config(PipelineConfig::from_env())
}

/// Run ingestion, transformation, and training against one config.
pub fn run_with_config(config: PipelineConfig) -> Result<TrainingReport> {
    info!(artifacts = %config.artifacts_dir.display(), "training pipeline started");

    let (train_path, test_path) = DataIngestion::new(config.clone()).run()?;
    let transformed = DataTransformation::new(config.clone()).run(&train_path, &test_path)?;
    let mut report = ModelTrainer::new(config).run(&transformed)?;
    report.preprocessor_path = Some(transformed.preprocessor_path);

    info!(
        best_model = %report.best_model,
        best_score = report.best_score,
        "training pipeline finished"
    );
    Ok(report)
}
