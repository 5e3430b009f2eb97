//! Standard (z-score) feature scaling

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScaleParams {
    mean: f64,
    std: f64,
}

/// Per-column standard scaler: `(x - mean) / std`.
///
/// A zero-variance column scales by 1.0 instead of dividing by zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    params: HashMap<String, ScaleParams>,
    is_fitted: bool,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self {
            params: HashMap::new(),
            is_fitted: false,
        }
    }

    /// Record mean and standard deviation for the listed columns.
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        for col_name in columns {
            let series = df
                .column(col_name)
                .map_err(|_| PipelineError::ColumnNotFound(col_name.to_string()))?
                .as_materialized_series();

            let ca = series
                .f64()
                .map_err(|e| PipelineError::Preprocessing(e.to_string()))?;

            let mean = ca.mean().unwrap_or(0.0);
            let std = ca.std(1).unwrap_or(1.0);
            self.params.insert(
                col_name.to_string(),
                ScaleParams {
                    mean,
                    std: if std == 0.0 { 1.0 } else { std },
                },
            );
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Scale fitted columns with the recorded parameters.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(PipelineError::NotFitted);
        }

        let replacements: Vec<Series> = self
            .params
            .iter()
            .filter_map(|(col_name, params)| {
                df.column(col_name).ok().map(|column| {
                    let series = column.as_materialized_series();
                    self.scale_series(series, params)
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut result = df.clone();
        for scaled in replacements {
            result = result
                .with_column(scaled)
                .map_err(|e| PipelineError::Preprocessing(e.to_string()))?
                .clone();
        }

        Ok(result)
    }

    fn scale_series(&self, series: &Series, params: &ScaleParams) -> Result<Series> {
        let ca = series
            .f64()
            .map_err(|e| PipelineError::Preprocessing(e.to_string()))?;

        let scaled: Float64Chunked = ca
            .into_iter()
            .map(|opt| opt.map(|v| (v - params.mean) / params.std))
            .collect();

        Ok(scaled.with_name(series.name().clone()).into_series())
    }
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::new()
    }
}
