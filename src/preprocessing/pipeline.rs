//! Fit-once preprocessing pipeline

use crate::error::{Result, TabstoreError};
use super::{
    encoder::LabelEncoder,
    imputer::{ImputeStrategy, Imputer},
    scaler::Scaler,
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Fitted transformation pipeline over a dataset's declared columns.
///
/// Four stages applied in a fixed order:
///   1. categorical label encoding
///   2. categorical most-frequent imputation (over the codes)
///   3. continuous standardization
///   4. continuous mean imputation (over the scaled values)
///
/// Each stage is fitted on the output of the stages before it, once, over the
/// full payload. Transform output is reordered to `categorical ++ continuous`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preprocessor {
    categorical_columns: Vec<String>,
    continuous_columns: Vec<String>,
    encoder: LabelEncoder,
    categorical_imputer: Imputer,
    scaler: Scaler,
    continuous_imputer: Imputer,
    is_fitted: bool,
}

impl Preprocessor {
    /// Fit the full chain on `df`.
    ///
    /// `categorical_columns` and `continuous_columns` must all be present in
    /// `df`; columns of `df` outside the two lists are ignored.
    pub fn fit(
        df: &DataFrame,
        categorical_columns: &[String],
        continuous_columns: &[String],
    ) -> Result<Self> {
        for col in categorical_columns.iter().chain(continuous_columns.iter()) {
            if df.column(col).is_err() {
                return Err(TabstoreError::ColumnNotFound(col.clone()));
            }
        }

        let mut encoder = LabelEncoder::new();
        let mut categorical_imputer = Imputer::new(ImputeStrategy::MostFrequent);
        let mut scaler = Scaler::new();
        let mut continuous_imputer = Imputer::new(ImputeStrategy::Mean);

        // Each stage fits on the data as transformed by the stages before it.
        encoder.fit(df, categorical_columns)?;
        let staged = encoder.transform(df)?;

        categorical_imputer.fit(&staged, categorical_columns)?;
        let staged = categorical_imputer.transform(&staged)?;

        scaler.fit(&staged, continuous_columns)?;
        let staged = scaler.transform(&staged)?;

        continuous_imputer.fit(&staged, continuous_columns)?;

        debug!(
            rows = df.height(),
            categorical = categorical_columns.len(),
            continuous = continuous_columns.len(),
            "preprocessing pipeline fitted"
        );

        Ok(Self {
            categorical_columns: categorical_columns.to_vec(),
            continuous_columns: continuous_columns.to_vec(),
            encoder,
            categorical_imputer,
            scaler,
            continuous_imputer,
            is_fitted: true,
        })
    }

    /// Apply all four stages to `df` and reorder the output columns to
    /// `categorical ++ continuous`.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(TabstoreError::PipelineNotFitted);
        }

        let result = self.encoder.transform(df)?;
        let result = self.categorical_imputer.transform(&result)?;
        let result = self.scaler.transform(&result)?;
        let result = self.continuous_imputer.transform(&result)?;

        let ordered: Vec<&str> = self
            .categorical_columns
            .iter()
            .chain(self.continuous_columns.iter())
            .map(|s| s.as_str())
            .collect();

        result
            .select(ordered)
            .map_err(|e| TabstoreError::DataError(e.to_string()))
    }

    /// Apply the inverse of each stage in reverse order, best-effort.
    ///
    /// Stages without an inverse (both imputers) are skipped, so rows that
    /// were imputed do not round-trip back to their original nulls. This is
    /// an accepted lossy inversion, not a failure.
    pub fn inverse_transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(TabstoreError::PipelineNotFitted);
        }

        let mut result = df.clone();

        // Each stage is asked whether it defines an inverse before any
        // attempt is made; a stage without one is skipped, never guessed at.
        if !self.continuous_imputer.supports_inverse() {
            debug!("continuous imputation stage has no inverse; skipping");
        }

        if self.scaler.supports_inverse() {
            result = self.scaler.inverse_transform(&result)?;
        }

        if !self.categorical_imputer.supports_inverse() {
            debug!("categorical imputation stage has no inverse; skipping");
        }

        if self.encoder.supports_inverse() {
            result = self.encoder.inverse_transform(&result)?;
        }

        Ok(result)
    }

    /// Fitted encoding map: column -> (original value -> code).
    pub fn encoding_map(&self) -> &HashMap<String, HashMap<String, i64>> {
        self.encoder.mappings()
    }

    /// Reverse encoding map: column -> (code -> original value).
    pub fn reverse_encoding_map(&self) -> HashMap<String, HashMap<i64, String>> {
        self.encoder.reverse_mappings()
    }

    /// Fitted (mean, std) for a continuous column.
    pub fn scaling_params(&self, column: &str) -> Option<(f64, f64)> {
        self.scaler.params(column)
    }

    /// Fitted fill value for a continuous column (in scaled units).
    pub fn continuous_fill_value(&self, column: &str) -> Option<f64> {
        self.continuous_imputer.fill_value(column)
    }

    /// Fitted fill code for a categorical column.
    pub fn categorical_fill_code(&self, column: &str) -> Option<i64> {
        self.categorical_imputer.fill_value(column).map(|v| v as i64)
    }

    pub fn categorical_columns(&self) -> &[String] {
        &self.categorical_columns
    }

    pub fn continuous_columns(&self) -> &[String] {
        &self.continuous_columns
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}
