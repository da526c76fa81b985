//! Continuous column standardization

use crate::error::{Result, TabstoreError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Parameters for one fitted column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ScalerParams {
    mean: f64,
    std: f64,
}

/// Standardizing scaler: (x - mean) / std, statistics frozen at fit time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaler {
    params: HashMap<String, ScalerParams>,
    is_fitted: bool,
}

impl Scaler {
    pub fn new() -> Self {
        Self {
            params: HashMap::new(),
            is_fitted: false,
        }
    }

    /// Fit the scaler to the given columns of `df`. Nulls are ignored when
    /// computing statistics.
    pub fn fit(&mut self, df: &DataFrame, columns: &[String]) -> Result<&mut Self> {
        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| TabstoreError::ColumnNotFound(col_name.clone()))?;

            let params = Self::compute_params(column.as_materialized_series())?;
            self.params.insert(col_name.clone(), params);
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Standardize the fitted columns.
    /// Builds all replacement columns first, then applies them in one pass.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(TabstoreError::PipelineNotFitted);
        }

        let replacements: Vec<Series> = self
            .params
            .iter()
            .filter_map(|(col_name, params)| {
                df.column(col_name).ok().map(|column| {
                    Self::scale_series(column.as_materialized_series(), params)
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut result = df.clone();
        for scaled in replacements {
            result = result
                .with_column(scaled)
                .map_err(|e| TabstoreError::DataError(e.to_string()))?
                .clone();
        }

        Ok(result)
    }

    /// Undo the standardization: x * std + mean.
    pub fn inverse_transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(TabstoreError::PipelineNotFitted);
        }

        let replacements: Vec<Series> = self
            .params
            .iter()
            .filter_map(|(col_name, params)| {
                df.column(col_name).ok().map(|column| {
                    Self::unscale_series(column.as_materialized_series(), params)
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut result = df.clone();
        for unscaled in replacements {
            result = result
                .with_column(unscaled)
                .map_err(|e| TabstoreError::DataError(e.to_string()))?
                .clone();
        }

        Ok(result)
    }

    /// Fitted (mean, std) for `column`, if any.
    pub fn params(&self, column: &str) -> Option<(f64, f64)> {
        self.params.get(column).map(|p| (p.mean, p.std))
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    pub fn supports_inverse(&self) -> bool {
        true
    }

    fn compute_params(series: &Series) -> Result<ScalerParams> {
        let ca = series
            .cast(&DataType::Float64)
            .map_err(|e| TabstoreError::DataError(e.to_string()))?
            .f64()
            .map_err(|e| TabstoreError::DataError(e.to_string()))?
            .clone();

        let mean = ca.mean().unwrap_or(0.0);
        let std = ca.std(1).unwrap_or(1.0);

        Ok(ScalerParams {
            mean,
            std: if std == 0.0 { 1.0 } else { std },
        })
    }

    fn scale_series(series: &Series, params: &ScalerParams) -> Result<Series> {
        let ca = series
            .cast(&DataType::Float64)
            .map_err(|e| TabstoreError::DataError(e.to_string()))?
            .f64()
            .map_err(|e| TabstoreError::DataError(e.to_string()))?
            .clone();

        let scaled: Float64Chunked = ca
            .into_iter()
            .map(|opt| opt.map(|v| (v - params.mean) / params.std))
            .collect();

        Ok(scaled.with_name(series.name().clone()).into_series())
    }

    fn unscale_series(series: &Series, params: &ScalerParams) -> Result<Series> {
        let ca = series
            .cast(&DataType::Float64)
            .map_err(|e| TabstoreError::DataError(e.to_string()))?
            .f64()
            .map_err(|e| TabstoreError::DataError(e.to_string()))?
            .clone();

        let unscaled: Float64Chunked = ca
            .into_iter()
            .map(|opt| opt.map(|v| v * params.std + params.mean))
            .collect();

        Ok(unscaled.with_name(series.name().clone()).into_series())
    }
}

impl Default for Scaler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_scaling() {
        let df = DataFrame::new(vec![Column::new(
            "a".into(),
            &[1.0, 2.0, 3.0, 4.0, 5.0],
        )])
        .unwrap();

        let mut scaler = Scaler::new();
        scaler.fit(&df, &["a".to_string()]).unwrap();
        let result = scaler.transform(&df).unwrap();

        let col = result.column("a").unwrap().f64().unwrap().clone();
        let mean: f64 = col.mean().unwrap();
        assert!(mean.abs() < 1e-10);
    }

    #[test]
    fn test_inverse_recovers_values() {
        let df = DataFrame::new(vec![Column::new(
            "a".into(),
            &[1.0, 2.0, 3.0, 4.0, 5.0],
        )])
        .unwrap();

        let mut scaler = Scaler::new();
        scaler.fit(&df, &["a".to_string()]).unwrap();
        let scaled = scaler.transform(&df).unwrap();
        let restored = scaler.inverse_transform(&scaled).unwrap();

        let original = df.column("a").unwrap().f64().unwrap().clone();
        let restored = restored.column("a").unwrap().f64().unwrap().clone();
        for (o, r) in original.into_iter().zip(restored.into_iter()) {
            assert!((o.unwrap() - r.unwrap()).abs() < 1e-10);
        }
    }

    #[test]
    fn test_zero_variance_guard() {
        let df = DataFrame::new(vec![Column::new("a".into(), &[5.0, 5.0, 5.0])]).unwrap();

        let mut scaler = Scaler::new();
        scaler.fit(&df, &["a".to_string()]).unwrap();

        let (mean, std) = scaler.params("a").unwrap();
        assert_eq!(mean, 5.0);
        assert_eq!(std, 1.0);

        let result = scaler.transform(&df).unwrap();
        let col = result.column("a").unwrap().f64().unwrap().clone();
        assert_eq!(col.get(0).unwrap(), 0.0);
    }

    #[test]
    fn test_nulls_pass_through() {
        let df = DataFrame::new(vec![Column::new(
            "a".into(),
            &[Some(1.0), None, Some(3.0)],
        )])
        .unwrap();

        let mut scaler = Scaler::new();
        scaler.fit(&df, &["a".to_string()]).unwrap();
        let result = scaler.transform(&df).unwrap();

        assert_eq!(result.column("a").unwrap().null_count(), 1);
    }
}
