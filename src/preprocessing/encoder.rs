//! One-hot encoding for categorical columns

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One-hot encoder with a deterministic column layout.
///
/// Categories are recorded in sorted order at fit time, so the encoded
/// column order is stable across runs. Values unseen during fit encode as
/// all zeros for that column group instead of raising.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneHotEncoder {
    // column name -> sorted category list
    categories: BTreeMap<String, Vec<String>>,
    is_fitted: bool,
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self {
            categories: BTreeMap::new(),
            is_fitted: false,
        }
    }

    /// Record the distinct categories of each listed column.
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| PipelineError::ColumnNotFound(col_name.to_string()))?;
            let ca = column
                .str()
                .map_err(|e| PipelineError::Preprocessing(e.to_string()))?;

            let mut cats: Vec<String> = ca
                .into_iter()
                .flatten()
                .map(|s| s.to_string())
                .collect();
            cats.sort();
            cats.dedup();

            self.categories.insert(col_name.to_string(), cats);
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Replace each fitted column with one 0/1 column per category.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(PipelineError::NotFitted);
        }

        let mut result = df.clone();

        for (col_name, cats) in &self.categories {
            let column = result
                .column(col_name)
                .map_err(|_| PipelineError::ColumnNotFound(col_name.to_string()))?
                .clone();
            let ca = column
                .str()
                .map_err(|e| PipelineError::Preprocessing(e.to_string()))?;

            for category in cats {
                let values: Vec<f64> = ca
                    .into_iter()
                    .map(|v| if v == Some(category.as_str()) { 1.0 } else { 0.0 })
                    .collect();

                let new_series =
                    Series::new(Self::encoded_name(col_name, category).into(), values);
                result = result
                    .with_column(new_series)
                    .map_err(|e| PipelineError::Preprocessing(e.to_string()))?
                    .clone();
            }

            result = result
                .drop(col_name)
                .map_err(|e| PipelineError::Preprocessing(e.to_string()))?;
        }

        Ok(result)
    }

    /// Encoded column names for one source column, in category order.
    pub fn encoded_names(&self, col_name: &str) -> Vec<String> {
        self.categories
            .get(col_name)
            .map(|cats| {
                cats.iter()
                    .map(|c| Self::encoded_name(col_name, c))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn encoded_name(col_name: &str, category: &str) -> String {
        format!("{}_{}", col_name, category)
    }
}

impl Default for OneHotEncoder {
    fn default() -> Self {
        Self::new()
    }
}
