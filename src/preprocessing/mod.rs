//! Feature preprocessing
//!
//! [`Preprocessor`] is the column-wise transformer fitted during training
//! and reused at inference: numeric columns get median imputation and
//! standard scaling, categorical columns get most-frequent imputation and
//! one-hot encoding. Fit happens exactly once, on the training features;
//! test and inference inputs are only transformed.

mod encoder;
mod imputer;
mod scaler;

pub use encoder::OneHotEncoder;
pub use imputer::{ImputeStrategy, Imputer};
pub use scaler::StandardScaler;

use crate::artifact;
use crate::error::{PipelineError, Result};
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Fitted column-wise feature transformer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preprocessor {
    numeric_columns: Vec<String>,
    categorical_columns: Vec<String>,
    numeric_imputer: Imputer,
    categorical_imputer: Imputer,
    scaler: StandardScaler,
    encoder: OneHotEncoder,
    is_fitted: bool,
}

impl Preprocessor {
    /// Create an unfitted preprocessor for the given feature columns.
    pub fn new(numeric_columns: Vec<String>, categorical_columns: Vec<String>) -> Self {
        Self {
            numeric_columns,
            categorical_columns,
            numeric_imputer: Imputer::new(ImputeStrategy::Median),
            categorical_imputer: Imputer::new(ImputeStrategy::MostFrequent),
            scaler: StandardScaler::new(),
            encoder: OneHotEncoder::new(),
            is_fitted: false,
        }
    }

    /// Fit imputers, scaler, and encoder on training features.
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        let df = self.coerce_numeric(df)?;

        let num_cols: Vec<&str> = self.numeric_columns.iter().map(|s| s.as_str()).collect();
        let cat_cols: Vec<&str> = self
            .categorical_columns
            .iter()
            .map(|s| s.as_str())
            .collect();

        if !num_cols.is_empty() {
            self.numeric_imputer.fit(&df, &num_cols)?;
            let imputed = self.numeric_imputer.transform(&df)?;
            self.scaler.fit(&imputed, &num_cols)?;
        }

        if !cat_cols.is_empty() {
            self.categorical_imputer.fit(&df, &cat_cols)?;
            let imputed = self.categorical_imputer.transform(&df)?;
            self.encoder.fit(&imputed, &cat_cols)?;
        }

        self.is_fitted = true;
        debug!(
            n_numeric = self.numeric_columns.len(),
            n_categorical = self.categorical_columns.len(),
            "preprocessor fitted"
        );
        Ok(self)
    }

    /// Transform features into a dense numeric matrix with a fixed column
    /// layout: scaled numeric columns first (config order), then one-hot
    /// groups per categorical column (sorted category order).
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(PipelineError::NotFitted);
        }

        let mut result = self.coerce_numeric(df)?;
        if !self.numeric_columns.is_empty() {
            result = self.numeric_imputer.transform(&result)?;
            result = self.scaler.transform(&result)?;
        }
        if !self.categorical_columns.is_empty() {
            result = self.categorical_imputer.transform(&result)?;
            result = self.encoder.transform(&result)?;
        }

        self.to_matrix(&result)
    }

    /// Fit on `df`, then transform it.
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<Array2<f64>> {
        self.fit(df)?;
        self.transform(df)
    }

    /// Output feature names in matrix column order.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = self.numeric_columns.clone();
        for col in &self.categorical_columns {
            names.extend(self.encoder.encoded_names(col));
        }
        names
    }

    /// Persist the fitted preprocessor as JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        artifact::save_json(path, self)
    }

    /// Load a preprocessor previously written with [`Preprocessor::save`].
    pub fn load(path: &Path) -> Result<Self> {
        artifact::load_json(path)
    }

    /// Cast numeric feature columns to Float64. Non-strict: entries that
    /// fail to parse become missing and are handled by imputation.
    fn coerce_numeric(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut result = df.clone();
        for col_name in &self.numeric_columns {
            let column = df
                .column(col_name)
                .map_err(|_| PipelineError::ColumnNotFound(col_name.clone()))?;
            if column.dtype() != &DataType::Float64 {
                let casted = column
                    .cast(&DataType::Float64)
                    .map_err(|e| PipelineError::Preprocessing(e.to_string()))?;
                result = result
                    .with_column(casted)
                    .map_err(|e| PipelineError::Preprocessing(e.to_string()))?
                    .clone();
            }
        }
        Ok(result)
    }

    fn to_matrix(&self, df: &DataFrame) -> Result<Array2<f64>> {
        let names = self.feature_names();
        let n_rows = df.height();
        let n_cols = names.len();

        let mut matrix = Array2::zeros((n_rows, n_cols));
        for (j, name) in names.iter().enumerate() {
            let column = df
                .column(name)
                .map_err(|_| PipelineError::ColumnNotFound(name.clone()))?;
            let ca = column
                .f64()
                .map_err(|e| PipelineError::Preprocessing(e.to_string()))?;
            for (i, val) in ca.into_iter().enumerate() {
                matrix[[i, j]] = val.unwrap_or(f64::NAN);
            }
        }

        Ok(matrix)
    }
}
