//! Dataset records: role metadata, payload, and the derived pipeline

mod record;
mod roles;

pub use record::{DatasetRecord, PayloadFormat};
pub use roles::{filtered_columns, ColumnRoles};

use crate::error::{Result, TabstoreError};
use crate::preprocessing::Preprocessor;
use polars::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Construction-time options for a dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetOptions {
    /// Number of rows retained in the construction-time sample
    pub sample_rows: usize,
    /// Seed for the sample draw; random when unset
    pub seed: Option<u64>,
}

impl Default for DatasetOptions {
    fn default() -> Self {
        Self {
            sample_rows: 10,
            seed: None,
        }
    }
}

/// One named tabular dataset: role metadata, an optional in-memory payload,
/// and a preprocessing pipeline derived from that payload.
///
/// The pipeline is fitted at most once per instance: construction with a
/// payload fits it immediately, and [`Dataset::ensure_preprocessor`] refuses
/// to refit an already-initialized one.
#[derive(Debug, Clone)]
pub struct Dataset {
    name: String,
    description: String,
    kind: String,
    roles: ColumnRoles,
    sample: Option<DataFrame>,
    payload: Option<DataFrame>,
    preprocessor: Option<Preprocessor>,
}

impl Dataset {
    /// Construct a dataset with default options.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        kind: impl Into<String>,
        roles: ColumnRoles,
        payload: Option<DataFrame>,
    ) -> Result<Self> {
        Self::with_options(name, description, kind, roles, payload, DatasetOptions::default())
    }

    /// Construct a dataset, drawing the row sample and deriving the
    /// preprocessing pipeline when a payload is given.
    pub fn with_options(
        name: impl Into<String>,
        description: impl Into<String>,
        kind: impl Into<String>,
        roles: ColumnRoles,
        payload: Option<DataFrame>,
        options: DatasetOptions,
    ) -> Result<Self> {
        roles.validate()?;

        let sample = match &payload {
            Some(df) => Some(Self::draw_sample(df, &options)?),
            None => None,
        };

        let mut dataset = Self {
            name: name.into(),
            description: description.into(),
            kind: kind.into(),
            roles,
            sample,
            payload,
            preprocessor: None,
        };

        if dataset.payload.is_some() {
            dataset.ensure_preprocessor()?;
        }

        Ok(dataset)
    }

    /// Reassemble a dataset from its persisted parts. The payload is always
    /// absent at this point; the store attaches it separately.
    pub(crate) fn from_parts(
        name: String,
        description: String,
        kind: String,
        roles: ColumnRoles,
        sample: Option<DataFrame>,
        preprocessor: Option<Preprocessor>,
    ) -> Result<Self> {
        roles.validate()?;
        Ok(Self {
            name,
            description,
            kind,
            roles,
            sample,
            payload: None,
            preprocessor,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn roles(&self) -> &ColumnRoles {
        &self.roles
    }

    pub fn sample(&self) -> Option<&DataFrame> {
        self.sample.as_ref()
    }

    pub fn payload(&self) -> Option<&DataFrame> {
        self.payload.as_ref()
    }

    pub fn preprocessor(&self) -> Option<&Preprocessor> {
        self.preprocessor.as_ref()
    }

    /// Attach a payload to a metadata-only dataset and derive the pipeline
    /// if none was persisted with it.
    pub fn attach_payload(&mut self, payload: DataFrame) -> Result<()> {
        self.payload = Some(payload);
        self.ensure_preprocessor()?;
        Ok(())
    }

    /// Derive the preprocessing pipeline from the current payload.
    ///
    /// A pipeline that is already fitted is returned untouched; statistics
    /// from the first fit are never recomputed, even if the payload changed.
    pub fn ensure_preprocessor(&mut self) -> Result<&Preprocessor> {
        if self.preprocessor.is_none() {
            let payload = self.payload.as_ref().ok_or_else(|| {
                TabstoreError::DataError(
                    "no payload loaded to derive the preprocessing pipeline from".to_string(),
                )
            })?;

            let pipeline =
                Preprocessor::fit(payload, &self.roles.categorical, &self.roles.continuous)?;
            self.preprocessor = Some(pipeline);
            debug!(dataset = %self.name, "preprocessing pipeline derived");
        }

        self.preprocessor
            .as_ref()
            .ok_or(TabstoreError::PipelineNotFitted)
    }

    /// Apply the derived pipeline to `df`.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        self.preprocessor
            .as_ref()
            .ok_or(TabstoreError::PipelineNotFitted)?
            .transform(df)
    }

    /// Undo the derived pipeline on `df`, best-effort.
    pub fn inverse_transform(&self, df: &DataFrame) -> Result<DataFrame> {
        self.preprocessor
            .as_ref()
            .ok_or(TabstoreError::PipelineNotFitted)?
            .inverse_transform(df)
    }

    /// Feature-role view over all declared columns.
    pub fn x_frame(&self) -> Result<Option<DataFrame>> {
        self.role_frame(self.roles.x_all())
    }

    /// Stratification-role view over all declared columns.
    pub fn t_frame(&self) -> Result<Option<DataFrame>> {
        self.role_frame(self.roles.t_all())
    }

    pub fn x_categorical_frame(&self) -> Result<Option<DataFrame>> {
        self.role_frame(self.roles.x_categorical())
    }

    pub fn x_continuous_frame(&self) -> Result<Option<DataFrame>> {
        self.role_frame(self.roles.x_continuous())
    }

    pub fn t_categorical_frame(&self) -> Result<Option<DataFrame>> {
        self.role_frame(self.roles.t_categorical())
    }

    pub fn t_continuous_frame(&self) -> Result<Option<DataFrame>> {
        self.role_frame(self.roles.t_continuous())
    }

    /// Select `columns` from the payload; `Ok(None)` when no payload is
    /// loaded (a metadata-only dataset, not an error).
    fn role_frame(&self, columns: Vec<String>) -> Result<Option<DataFrame>> {
        let Some(payload) = &self.payload else {
            return Ok(None);
        };

        let df = payload
            .select(columns.iter().map(|s| s.as_str()))
            .map_err(|e| TabstoreError::DataError(e.to_string()))?;
        Ok(Some(df))
    }

    fn draw_sample(df: &DataFrame, options: &DatasetOptions) -> Result<DataFrame> {
        if df.height() <= options.sample_rows {
            return Ok(df.clone());
        }

        let mut rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut picked =
            rand::seq::index::sample(&mut rng, df.height(), options.sample_rows).into_vec();
        picked.sort_unstable();

        let indices: Vec<IdxSize> = picked.into_iter().map(|i| i as IdxSize).collect();
        let idx = IdxCa::from_vec("sample_idx".into(), indices);

        df.take(&idx)
            .map_err(|e| TabstoreError::DataError(e.to_string()))
    }
}
