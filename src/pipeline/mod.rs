//! End-to-end pipelines
//!
//! [`train`] chains ingestion, transformation, and training into one run;
//! [`predict`] serves predictions from the persisted artifacts.

pub mod predict;
pub mod train;

pub use predict::{ExamRecord, PredictPipeline};
pub use train::{run_training_pipeline, run_with_config};
