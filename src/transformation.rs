//! Data transformation stage
//!
//! Fits the [`Preprocessor`] on the training split, applies it to both
//! splits, and persists it for inference. Only the training rows ever
//! influence the fitted statistics.

use crate::config::PipelineConfig;
use crate::data;
use crate::error::{PipelineError, Result};
use crate::preprocessing::Preprocessor;
use ndarray::{Array1, Array2};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;

/// Matrices produced by the transformation stage.
pub struct TransformedData {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<f64>,
    pub y_test: Array1<f64>,
    pub preprocessor_path: PathBuf,
}

pub struct DataTransformation {
    config: PipelineConfig,
}

impl DataTransformation {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, train_path: &Path, test_path: &Path) -> Result<TransformedData> {
        let train = data::load_csv(train_path)?;
        let test = data::load_csv(test_path)?;
        info!(
            train_rows = train.height(),
            test_rows = test.height(),
            "starting data transformation"
        );

        let y_train = self.extract_target(&train)?;
        let y_test = self.extract_target(&test)?;
        let train_features = train.drop(&self.config.target_column)?;
        let test_features = test.drop(&self.config.target_column)?;

        let mut preprocessor = Preprocessor::new(
            self.config.numeric_columns.clone(),
            self.config.categorical_columns.clone(),
        );
        let x_train = preprocessor.fit_transform(&train_features)?;
        let x_test = preprocessor.transform(&test_features)?;

        preprocessor.save(&self.config.preprocessor_path)?;
        info!(
            n_features = x_train.ncols(),
            path = %self.config.preprocessor_path.display(),
            "preprocessor fitted and saved"
        );

        Ok(TransformedData {
            x_train,
            x_test,
            y_train,
            y_test,
            preprocessor_path: self.config.preprocessor_path.clone(),
        })
    }

    /// Pull the target column as f64. The cast is non-strict, so rows with
    /// an unparseable label come through as NaN rather than failing the run.
    fn extract_target(&self, df: &DataFrame) -> Result<Array1<f64>> {
        let column = df
            .column(&self.config.target_column)
            .map_err(|_| PipelineError::ColumnNotFound(self.config.target_column.clone()))?;
        let casted = column
            .cast(&DataType::Float64)
            .map_err(|e| PipelineError::Preprocessing(e.to_string()))?;
        let ca = casted
            .f64()
            .map_err(|e| PipelineError::Preprocessing(e.to_string()))?;

        Ok(Array1::from_iter(
            ca.into_iter().map(|v| v.unwrap_or(f64::NAN)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;

    fn write_split(dir: &Path, name: &str, rows: usize, offset: usize) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "gender,race_ethnicity,parental_level_of_education,lunch,test_preparation_course,math_score,reading_score,writing_score").unwrap();
        for i in 0..rows {
            let gender = if i % 2 == 0 { "female" } else { "male" };
            writeln!(
                file,
                "{gender},group B,high school,standard,completed,{},{},{}",
                60 + i + offset,
                62 + i,
                58 + i
            )
            .unwrap();
        }
        path
    }

    #[test]
    fn test_run_produces_aligned_matrices() {
        let dir = tempfile::tempdir().unwrap();
        let train_path = write_split(dir.path(), "train.csv", 12, 0);
        let test_path = write_split(dir.path(), "test.csv", 4, 3);
        let config = PipelineConfig::with_artifacts_dir(dir.path().join("artifacts"));

        let transformed = DataTransformation::new(config.clone())
            .run(&train_path, &test_path)
            .unwrap();

        assert_eq!(transformed.x_train.nrows(), 12);
        assert_eq!(transformed.x_test.nrows(), 4);
        assert_eq!(transformed.x_train.ncols(), transformed.x_test.ncols());
        assert_eq!(transformed.y_train.len(), 12);
        assert_eq!(transformed.y_test.len(), 4);
        assert!(config.preprocessor_path.exists());
    }

    #[test]
    fn test_saved_preprocessor_reusable() {
        let dir = tempfile::tempdir().unwrap();
        let train_path = write_split(dir.path(), "train.csv", 12, 0);
        let test_path = write_split(dir.path(), "test.csv", 4, 3);
        let config = PipelineConfig::with_artifacts_dir(dir.path().join("artifacts"));

        let transformed = DataTransformation::new(config.clone())
            .run(&train_path, &test_path)
            .unwrap();

        let loaded = Preprocessor::load(&config.preprocessor_path).unwrap();
        let test_df = data::load_csv(&test_path)
            .unwrap()
            .drop(&config.target_column)
            .unwrap();
        assert_eq!(loaded.transform(&test_df).unwrap(), transformed.x_test);
    }

    #[test]
    fn test_missing_target_column_errors() {
        let dir = tempfile::tempdir().unwrap();
        let train_path = write_split(dir.path(), "train.csv", 12, 0);
        let test_path = write_split(dir.path(), "test.csv", 4, 3);
        let mut config = PipelineConfig::with_artifacts_dir(dir.path().join("artifacts"));
        config.target_column = "nonexistent".to_string();

        let result = DataTransformation::new(config).run(&train_path, &test_path);
        assert!(matches!(result, Err(PipelineError::ColumnNotFound(_))));
    }

    #[test]
    fn test_unparseable_target_becomes_nan() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.csv");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "gender,race_ethnicity,parental_level_of_education,lunch,test_preparation_course,math_score,reading_score,writing_score").unwrap();
        writeln!(file, "female,group A,some college,standard,none,abc,70,72").unwrap();
        writeln!(file, "male,group B,high school,free/reduced,none,55,60,58").unwrap();

        let config = PipelineConfig::with_artifacts_dir(dir.path().join("artifacts"));
        let transformation = DataTransformation::new(config);
        let df = data::load_csv(&path).unwrap();
        let y = transformation.extract_target(&df).unwrap();

        assert!(y[0].is_nan());
        assert_eq!(y[1], 55.0);
    }
}
