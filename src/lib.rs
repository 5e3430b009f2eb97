//! Student exam score prediction pipeline.
//!
//! A small end-to-end regression system: ingest a tabular CSV, split it
//! deterministically, fit a column-wise preprocessor and a set of
//! candidate regressors, persist the best model, and serve predictions
//! from the saved artifacts.
//!
//! The stages compose through [`pipeline::run_training_pipeline`]:
//!
//! 1. [`ingestion`] archives the raw data and writes the train/test split
//! 2. [`transformation`] fits the preprocessor and produces matrices
//! 3. [`trainer`] evaluates the candidate models and saves the winner
//!
//! Inference goes through [`pipeline::PredictPipeline`], which lazily
//! loads the persisted preprocessor and model.

pub mod artifact;
pub mod config;
pub mod data;
pub mod error;
pub mod ingestion;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod preprocessing;
pub mod trainer;
pub mod transformation;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
