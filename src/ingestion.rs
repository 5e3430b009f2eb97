//! Data ingestion stage
//!
//! Reads the source CSV, archives a raw copy under the artifacts
//! directory, and writes the deterministic train/test split that the
//! later stages consume.

use crate::config::PipelineConfig;
use crate::data;
use crate::error::{PipelineError, Result};
use std::fs;
use std::path::PathBuf;
use tracing::info;

pub struct DataIngestion {
    config: PipelineConfig,
}

impl DataIngestion {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run ingestion and return the train and test CSV paths.
    pub fn run(&self) -> Result<(PathBuf, PathBuf)> {
        info!(source = %self.config.source_data_path.display(), "starting data ingestion");

        let df = data::load_csv(&self.config.source_data_path)?;
        if df.height() == 0 {
            return Err(PipelineError::Ingestion(format!(
                "source dataset {} has no rows",
                self.config.source_data_path.display()
            )));
        }
        info!(rows = df.height(), cols = df.width(), "source data loaded");

        fs::create_dir_all(&self.config.artifacts_dir)?;

        let mut raw = df.clone();
        data::save_csv(&mut raw, &self.config.raw_data_path)?;

        let (mut train, mut test) =
            data::train_test_split(&df, self.config.test_fraction, self.config.split_seed)?;
        data::save_csv(&mut train, &self.config.train_data_path)?;
        data::save_csv(&mut test, &self.config.test_data_path)?;

        info!(
            train_rows = train.height(),
            test_rows = test.height(),
            "ingestion complete"
        );
        Ok((
            self.config.train_data_path.clone(),
            self.config.test_data_path.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_source(dir: &std::path::Path) -> PathBuf {
        let path = dir.join("stud.csv");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "gender,race_ethnicity,parental_level_of_education,lunch,test_preparation_course,math_score,reading_score,writing_score").unwrap();
        for i in 0..20 {
            writeln!(
                file,
                "female,group A,some college,standard,none,{},{},{}",
                50 + i,
                55 + i,
                52 + i
            )
            .unwrap();
        }
        path
    }

    #[test]
    fn test_run_writes_all_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_source(dir.path());
        let config = PipelineConfig::with_artifacts_dir(dir.path().join("artifacts"))
            .with_source(source);

        let ingestion = DataIngestion::new(config.clone());
        let (train_path, test_path) = ingestion.run().unwrap();

        assert!(config.raw_data_path.exists());
        assert!(train_path.exists());
        assert!(test_path.exists());

        let train = data::load_csv(&train_path).unwrap();
        let test = data::load_csv(&test_path).unwrap();
        assert_eq!(train.height() + test.height(), 20);
        assert_eq!(test.height(), 4); // ceil(20 * 0.2)
    }

    #[test]
    fn test_repeat_runs_identical_split() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_source(dir.path());
        let config = PipelineConfig::with_artifacts_dir(dir.path().join("artifacts"))
            .with_source(source);

        let ingestion = DataIngestion::new(config.clone());
        ingestion.run().unwrap();
        let first = fs::read_to_string(&config.train_data_path).unwrap();
        ingestion.run().unwrap();
        let second = fs::read_to_string(&config.train_data_path).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_source_errors() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::with_artifacts_dir(dir.path().join("artifacts"))
            .with_source(dir.path().join("absent.csv"));

        assert!(DataIngestion::new(config).run().is_err());
    }
}
