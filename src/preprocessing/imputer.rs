//! Missing value imputation

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    /// Median of the non-missing values; numeric columns only.
    Median,
    /// Most frequent non-missing value; ties go to the smaller value.
    MostFrequent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FillValue {
    Numeric(f64),
    Text(String),
}

/// Column-wise imputer fitted on training data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Imputer {
    strategy: ImputeStrategy,
    fill_values: HashMap<String, FillValue>,
    is_fitted: bool,
}

impl Imputer {
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self {
            strategy,
            fill_values: HashMap::new(),
            is_fitted: false,
        }
    }

    /// Compute one fill value per listed column.
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| PipelineError::ColumnNotFound(col_name.to_string()))?;

            let fill = match self.strategy {
                ImputeStrategy::Median => Self::median_of(column)?,
                ImputeStrategy::MostFrequent => Self::mode_of(column)?,
            };
            self.fill_values.insert(col_name.to_string(), fill);
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Replace missing entries in the fitted columns.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(PipelineError::NotFitted);
        }

        let mut result = df.clone();
        for (col_name, fill) in &self.fill_values {
            let column = result
                .column(col_name)
                .map_err(|_| PipelineError::ColumnNotFound(col_name.clone()))?;
            if column.null_count() == 0 {
                continue;
            }

            let filled = match fill {
                FillValue::Numeric(v) => {
                    let ca = column
                        .f64()
                        .map_err(|e| PipelineError::Preprocessing(e.to_string()))?;
                    ca.fill_null_with_values(*v)
                        .map_err(|e| PipelineError::Preprocessing(e.to_string()))?
                        .into_series()
                }
                FillValue::Text(v) => {
                    let ca = column
                        .str()
                        .map_err(|e| PipelineError::Preprocessing(e.to_string()))?;
                    ca.set(&ca.is_null(), Some(v.as_str()))
                        .map_err(|e| PipelineError::Preprocessing(e.to_string()))?
                        .into_series()
                }
            };

            result = result
                .with_column(filled.with_name(col_name.as_str().into()))
                .map_err(|e| PipelineError::Preprocessing(e.to_string()))?
                .clone();
        }

        Ok(result)
    }

    fn median_of(column: &Column) -> Result<FillValue> {
        let ca = column
            .f64()
            .map_err(|e| PipelineError::Preprocessing(e.to_string()))?;

        let mut values: Vec<f64> = ca.into_iter().flatten().collect();
        if values.is_empty() {
            return Err(PipelineError::Preprocessing(format!(
                "column '{}' has no non-missing values to impute from",
                column.name()
            )));
        }
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let mid = values.len() / 2;
        let median = if values.len() % 2 == 0 {
            (values[mid - 1] + values[mid]) / 2.0
        } else {
            values[mid]
        };
        Ok(FillValue::Numeric(median))
    }

    fn mode_of(column: &Column) -> Result<FillValue> {
        let ca = column
            .str()
            .map_err(|e| PipelineError::Preprocessing(e.to_string()))?;

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for value in ca.into_iter().flatten() {
            *counts.entry(value).or_insert(0) += 1;
        }
        if counts.is_empty() {
            return Err(PipelineError::Preprocessing(format!(
                "column '{}' has no non-missing values to impute from",
                column.name()
            )));
        }

        // Deterministic: on tied counts, take the smaller value
        let mode = counts
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(a.0)))
            .map(|(value, _)| value.to_string())
            .unwrap_or_default();
        Ok(FillValue::Text(mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_imputation() {
        let df = DataFrame::new(vec![Column::new(
            "score".into(),
            &[Some(10.0), None, Some(30.0), Some(20.0)],
        )])
        .unwrap();

        let mut imputer = Imputer::new(ImputeStrategy::Median);
        imputer.fit(&df, &["score"]).unwrap();
        let result = imputer.transform(&df).unwrap();

        let ca = result.column("score").unwrap().f64().unwrap();
        assert_eq!(ca.get(1).unwrap(), 20.0);
        assert_eq!(ca.null_count(), 0);
    }

    #[test]
    fn test_median_even_count() {
        let df = DataFrame::new(vec![Column::new(
            "score".into(),
            &[Some(1.0), Some(2.0), Some(3.0), Some(4.0), None],
        )])
        .unwrap();

        let mut imputer = Imputer::new(ImputeStrategy::Median);
        imputer.fit(&df, &["score"]).unwrap();
        let result = imputer.transform(&df).unwrap();
        assert_eq!(result.column("score").unwrap().f64().unwrap().get(4).unwrap(), 2.5);
    }

    #[test]
    fn test_most_frequent_imputation() {
        let df = DataFrame::new(vec![Column::new(
            "city".into(),
            &[Some("NYC"), Some("LA"), Some("NYC"), None],
        )])
        .unwrap();

        let mut imputer = Imputer::new(ImputeStrategy::MostFrequent);
        imputer.fit(&df, &["city"]).unwrap();
        let result = imputer.transform(&df).unwrap();

        let ca = result.column("city").unwrap().str().unwrap();
        assert_eq!(ca.get(3).unwrap(), "NYC");
    }

    #[test]
    fn test_mode_tie_breaks_to_smaller() {
        let df = DataFrame::new(vec![Column::new(
            "city".into(),
            &[Some("LA"), Some("NYC"), None],
        )])
        .unwrap();

        let mut imputer = Imputer::new(ImputeStrategy::MostFrequent);
        imputer.fit(&df, &["city"]).unwrap();
        let result = imputer.transform(&df).unwrap();
        assert_eq!(result.column("city").unwrap().str().unwrap().get(2).unwrap(), "LA");
    }

    #[test]
    fn test_fill_value_comes_from_fit_data() {
        let train = DataFrame::new(vec![Column::new(
            "score".into(),
            &[Some(10.0), Some(20.0), Some(30.0)],
        )])
        .unwrap();
        let test = DataFrame::new(vec![Column::new(
            "score".into(),
            &[Some(100.0), None],
        )])
        .unwrap();

        let mut imputer = Imputer::new(ImputeStrategy::Median);
        imputer.fit(&train, &["score"]).unwrap();
        let result = imputer.transform(&test).unwrap();
        assert_eq!(result.column("score").unwrap().f64().unwrap().get(1).unwrap(), 20.0);
    }

    #[test]
    fn test_transform_before_fit_errors() {
        let df = DataFrame::new(vec![Column::new("score".into(), &[1.0])]).unwrap();
        let imputer = Imputer::new(ImputeStrategy::Median);
        assert!(matches!(
            imputer.transform(&df),
            Err(PipelineError::NotFitted)
        ));
    }

    #[test]
    fn test_all_missing_column_errors() {
        let df = DataFrame::new(vec![Column::new(
            "score".into(),
            &[None::<f64>, None, None],
        )])
        .unwrap();

        let mut imputer = Imputer::new(ImputeStrategy::Median);
        assert!(imputer.fit(&df, &["score"]).is_err());
    }
}
