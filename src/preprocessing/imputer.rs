//! Missing value imputation

use crate::error::{Result, TabstoreError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Strategy for filling missing values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    /// Replace with the fit-time mean (continuous columns)
    Mean,
    /// Replace with the most frequent fit-time value (encoded categorical columns)
    MostFrequent,
}

/// A frozen per-column fill value.
///
/// Encoded categorical columns carry integer codes; filling them with a
/// float would silently retype the column, so the dtype is preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum FillValue {
    Int(i64),
    Float(f64),
}

/// Imputer for missing values with statistics frozen at fit time.
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

    /// Fit the imputer to the given columns of `df`.
    pub fn fit(&mut self, df: &DataFrame, columns: &[String]) -> Result<&mut Self> {
        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| TabstoreError::ColumnNotFound(col_name.clone()))?;

            let fill_value = self.compute_fill_value(column.as_materialized_series())?;
            self.fill_values.insert(col_name.clone(), fill_value);
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Fill nulls in the fitted columns with the frozen values.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(TabstoreError::PipelineNotFitted);
        }

        let mut result = df.clone();

        for (col_name, fill_value) in &self.fill_values {
            if let Ok(column) = df.column(col_name) {
                let filled = Self::fill_series(column.as_materialized_series(), fill_value)?;
                result = result
                    .with_column(filled)
                    .map_err(|e| TabstoreError::DataError(e.to_string()))?
                    .clone();
            }
        }

        Ok(result)
    }

    /// Fitted fill value for `column`, as f64, if any.
    pub fn fill_value(&self, column: &str) -> Option<f64> {
        self.fill_values.get(column).map(|v| match v {
            FillValue::Int(i) => *i as f64,
            FillValue::Float(f) => *f,
        })
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Imputed cells are indistinguishable from observed ones afterwards,
    /// so this stage defines no inverse.
    pub fn supports_inverse(&self) -> bool {
        false
    }

    fn compute_fill_value(&self, series: &Series) -> Result<FillValue> {
        match self.strategy {
            ImputeStrategy::Mean => {
                let mean = series
                    .cast(&DataType::Float64)
                    .map_err(|e| TabstoreError::DataError(e.to_string()))?
                    .f64()
                    .map_err(|e| TabstoreError::DataError(e.to_string()))?
                    .mean()
                    .unwrap_or(0.0);
                Ok(FillValue::Float(mean))
            }
            ImputeStrategy::MostFrequent => {
                let mode = Self::compute_mode_int(series)?;
                Ok(FillValue::Int(mode))
            }
        }
    }

    /// Most frequent value of an integer-coded series. Ties resolve to the
    /// smallest code so the result is deterministic.
    fn compute_mode_int(series: &Series) -> Result<i64> {
        let ca = series
            .cast(&DataType::Int64)
            .map_err(|e| TabstoreError::DataError(e.to_string()))?
            .i64()
            .map_err(|e| TabstoreError::DataError(e.to_string()))?
            .clone();

        let mut counts: HashMap<i64, usize> = HashMap::new();
        for val in ca.into_iter().flatten() {
            *counts.entry(val).or_insert(0) += 1;
        }

        let mode = counts
            .into_iter()
            .max_by(|(a_val, a_count), (b_val, b_count)| {
                a_count.cmp(b_count).then(b_val.cmp(a_val))
            })
            .map(|(val, _)| val)
            .unwrap_or(0);

        Ok(mode)
    }

    fn fill_series(series: &Series, fill_value: &FillValue) -> Result<Series> {
        match fill_value {
            FillValue::Float(val) => {
                let ca = series
                    .cast(&DataType::Float64)
                    .map_err(|e| TabstoreError::DataError(e.to_string()))?
                    .f64()
                    .map_err(|e| TabstoreError::DataError(e.to_string()))?
                    .clone();

                let filled: Float64Chunked = ca
                    .into_iter()
                    .map(|opt| Some(opt.unwrap_or(*val)))
                    .collect();

                Ok(filled.with_name(series.name().clone()).into_series())
            }
            FillValue::Int(val) => {
                let ca = series
                    .cast(&DataType::Int64)
                    .map_err(|e| TabstoreError::DataError(e.to_string()))?
                    .i64()
                    .map_err(|e| TabstoreError::DataError(e.to_string()))?
                    .clone();

                let filled: Int64Chunked = ca
                    .into_iter()
                    .map(|opt| Some(opt.unwrap_or(*val)))
                    .collect();

                Ok(filled.with_name(series.name().clone()).into_series())
            }
        }
    }
}
