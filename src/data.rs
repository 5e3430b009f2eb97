//! CSV loading, saving, and the deterministic train/test split

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fs::File;
use std::path::Path;

/// Load a CSV file with a header row and inferred schema.
pub fn load_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)
        .map_err(|e| PipelineError::Data(format!("{}: {e}", path.display())))?;

    let reader = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .into_reader_with_file_handle(file);

    reader
        .finish()
        .map_err(|e| PipelineError::Data(e.to_string()))
}

/// Write a DataFrame as CSV with a header row, overwriting any existing file.
pub fn save_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = File::create(path)
        .map_err(|e| PipelineError::Data(format!("{}: {e}", path.display())))?;

    CsvWriter::new(&mut file)
        .finish(df)
        .map_err(|e| PipelineError::Data(e.to_string()))
}

/// Split rows into train and test sets with a seeded shuffle.
///
/// The split is deterministic for a fixed seed: the same input produces
/// byte-identical train and test frames on every run.
pub fn train_test_split(
    df: &DataFrame,
    test_fraction: f64,
    seed: u64,
) -> Result<(DataFrame, DataFrame)> {
    if !(0.0..1.0).contains(&test_fraction) {
        return Err(PipelineError::Data(format!(
            "test_fraction must be in [0, 1), got {test_fraction}"
        )));
    }

    let n = df.height();
    let n_test = ((n as f64) * test_fraction).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(PipelineError::Data(format!(
            "cannot split {n} rows into train/test with test_fraction {test_fraction}"
        )));
    }

    let mut indices: Vec<u32> = (0..n as u32).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test_idx = IdxCa::from_vec("idx".into(), indices[..n_test].to_vec());
    let train_idx = IdxCa::from_vec("idx".into(), indices[n_test..].to_vec());

    let test = df.take(&test_idx)?;
    let train = df.take(&train_idx)?;
    Ok((train, test))
}
