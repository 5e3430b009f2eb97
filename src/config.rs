//! Pipeline configuration
//!
//! One [`PipelineConfig`] is resolved at process start (environment read
//! exactly once) and passed down to every stage. All artifact paths are
//! derived from the same root directory, so stages agree on a shared
//! location without explicit handoff.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the artifact root directory.
pub const ARTIFACTS_DIR_ENV: &str = "ARTIFACTS_DIR";

/// Default artifact root when the environment variable is unset.
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// Default source dataset location.
pub const DEFAULT_SOURCE_DATA: &str = "data/stud.csv";

/// Shared configuration for all pipeline stages.
///
/// Derived file paths are computed once in the constructor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Root directory for all artifacts.
    pub artifacts_dir: PathBuf,
    /// Path to the source dataset CSV.
    pub source_data_path: PathBuf,
    /// Copy of the source dataset, written by ingestion.
    pub raw_data_path: PathBuf,
    /// Training split, written by ingestion.
    pub train_data_path: PathBuf,
    /// Test split, written by ingestion.
    pub test_data_path: PathBuf,
    /// Fitted preprocessor, written by transformation.
    pub preprocessor_path: PathBuf,
    /// Best trained model, written by training.
    pub model_path: PathBuf,
    /// Target column (numeric label).
    pub target_column: String,
    /// Numeric feature columns.
    pub numeric_columns: Vec<String>,
    /// Categorical feature columns.
    pub categorical_columns: Vec<String>,
    /// Fraction of rows held out for the test split.
    pub test_fraction: f64,
    /// Seed for the deterministic shuffle split.
    pub split_seed: u64,
}

impl PipelineConfig {
    /// Resolve the artifact root from `ARTIFACTS_DIR`, falling back to
    /// `artifacts`. Call once at startup and pass the config down; stages
    /// never read the environment themselves.
    pub fn from_env() -> Self {
        let root = std::env::var(ARTIFACTS_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_ARTIFACTS_DIR));
        Self::with_artifacts_dir(root)
    }

    /// Build a config rooted at an explicit artifact directory.
    pub fn with_artifacts_dir(root: impl Into<PathBuf>) -> Self {
        let artifacts_dir: PathBuf = root.into();
        Self {
            raw_data_path: artifacts_dir.join("raw.csv"),
            train_data_path: artifacts_dir.join("train.csv"),
            test_data_path: artifacts_dir.join("test.csv"),
            preprocessor_path: artifacts_dir.join("preprocessor.json"),
            model_path: artifacts_dir.join("model.json"),
            artifacts_dir,
            source_data_path: PathBuf::from(DEFAULT_SOURCE_DATA),
            target_column: "math_score".to_string(),
            numeric_columns: vec![
                "reading_score".to_string(),
                "writing_score".to_string(),
            ],
            categorical_columns: vec![
                "gender".to_string(),
                "race_ethnicity".to_string(),
                "parental_level_of_education".to_string(),
                "lunch".to_string(),
                "test_preparation_course".to_string(),
            ],
            test_fraction: 0.2,
            split_seed: 42,
        }
    }

    /// Override the source dataset path.
    pub fn with_source(mut self, path: impl AsRef<Path>) -> Self {
        self.source_data_path = path.as_ref().to_path_buf();
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::with_artifacts_dir(DEFAULT_ARTIFACTS_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_paths_share_root() {
        let config = PipelineConfig::with_artifacts_dir("/tmp/run1");
        assert_eq!(config.raw_data_path, PathBuf::from("/tmp/run1/raw.csv"));
        assert_eq!(config.train_data_path, PathBuf::from("/tmp/run1/train.csv"));
        assert_eq!(config.test_data_path, PathBuf::from("/tmp/run1/test.csv"));
        assert_eq!(
            config.preprocessor_path,
            PathBuf::from("/tmp/run1/preprocessor.json")
        );
        assert_eq!(config.model_path, PathBuf::from("/tmp/run1/model.json"));
    }

    #[test]
    fn test_default_schema() {
        let config = PipelineConfig::default();
        assert_eq!(config.target_column, "math_score");
        assert_eq!(config.numeric_columns.len(), 2);
        assert_eq!(config.categorical_columns.len(), 5);
        assert!((config.test_fraction - 0.2).abs() < f64::EPSILON);
    }
}
