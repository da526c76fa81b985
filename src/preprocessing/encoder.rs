//! Categorical label encoding

use crate::error::{Result, TabstoreError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-column label encoder for categorical values.
///
/// Codes are assigned in first-appearance order, so the mapping is
/// deterministic for a fixed payload. Nulls and values unseen at fit time
/// encode to null; the categorical imputation stage downstream fills them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelEncoder {
    // Maps column name -> (category -> code)
    mappings: HashMap<String, HashMap<String, i64>>,
    is_fitted: bool,
}

impl LabelEncoder {
    pub fn new() -> Self {
        Self {
            mappings: HashMap::new(),
            is_fitted: false,
        }
    }

    /// Fit the encoder to the given columns of `df`.
    pub fn fit(&mut self, df: &DataFrame, columns: &[String]) -> Result<&mut Self> {
        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| TabstoreError::ColumnNotFound(col_name.clone()))?;
            let series = column.as_materialized_series();

            let mapping = Self::build_mapping(series)?;
            self.mappings.insert(col_name.clone(), mapping);
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Replace each fitted column with its integer codes.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(TabstoreError::PipelineNotFitted);
        }

        let mut result = df.clone();

        for (col_name, mapping) in &self.mappings {
            if let Ok(column) = df.column(col_name) {
                let ca = column
                    .as_materialized_series()
                    .cast(&DataType::String)
                    .map_err(|e| TabstoreError::DataError(e.to_string()))?
                    .str()
                    .map_err(|e| TabstoreError::DataError(e.to_string()))?
                    .clone();

                let values: Vec<Option<i64>> = ca
                    .into_iter()
                    .map(|v| v.and_then(|s| mapping.get(s).copied()))
                    .collect();

                let encoded = Series::new(col_name.as_str().into(), values);
                result = result
                    .with_column(encoded)
                    .map_err(|e| TabstoreError::DataError(e.to_string()))?
                    .clone();
            }
        }

        Ok(result)
    }

    /// Map integer codes back to the original labels.
    ///
    /// Codes with no reverse entry (and nulls) decode to null.
    pub fn inverse_transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(TabstoreError::PipelineNotFitted);
        }

        let mut result = df.clone();

        for (col_name, mapping) in &self.mappings {
            if let Ok(column) = df.column(col_name) {
                let reverse: HashMap<i64, &str> = mapping
                    .iter()
                    .map(|(value, code)| (*code, value.as_str()))
                    .collect();

                let ca = column
                    .as_materialized_series()
                    .cast(&DataType::Int64)
                    .map_err(|e| TabstoreError::DataError(e.to_string()))?
                    .i64()
                    .map_err(|e| TabstoreError::DataError(e.to_string()))?
                    .clone();

                let values: Vec<Option<String>> = ca
                    .into_iter()
                    .map(|v| v.and_then(|code| reverse.get(&code).map(|s| s.to_string())))
                    .collect();

                let decoded = Series::new(col_name.as_str().into(), values);
                result = result
                    .with_column(decoded)
                    .map_err(|e| TabstoreError::DataError(e.to_string()))?
                    .clone();
            }
        }

        Ok(result)
    }

    /// Fitted forward mapping: column -> (category -> code).
    pub fn mappings(&self) -> &HashMap<String, HashMap<String, i64>> {
        &self.mappings
    }

    /// Reverse mapping: column -> (code -> category).
    pub fn reverse_mappings(&self) -> HashMap<String, HashMap<i64, String>> {
        self.mappings
            .iter()
            .map(|(col, mapping)| {
                let reverse = mapping
                    .iter()
                    .map(|(value, code)| (*code, value.clone()))
                    .collect();
                (col.clone(), reverse)
            })
            .collect()
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Inversion is exact for values seen at fit time.
    pub fn supports_inverse(&self) -> bool {
        true
    }

    fn build_mapping(series: &Series) -> Result<HashMap<String, i64>> {
        let mut mapping = HashMap::new();
        let ca = series
            .cast(&DataType::String)
            .map_err(|e| TabstoreError::DataError(e.to_string()))?
            .str()
            .map_err(|e| TabstoreError::DataError(e.to_string()))?
            .clone();

        let mut code = 0i64;
        for val in ca.into_iter().flatten() {
            if !mapping.contains_key(val) {
                mapping.insert(val.to_string(), code);
                code += 1;
            }
        }

        Ok(mapping)
    }
}

impl Default for LabelEncoder {
    fn default() -> Self {
        Self::new()
    }
}
