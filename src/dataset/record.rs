//! Persisted metadata shape for a dataset

use crate::error::Result;
use crate::preprocessing::Preprocessor;
use crate::utils::{dataframe_from_csv_str, dataframe_to_csv_string};
use serde::{Deserialize, Serialize};

use super::{ColumnRoles, Dataset};

/// Naming scheme for the payload artifact stored next to the metadata blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayloadFormat {
    /// `<name>.csv`
    Csv,
    /// `<name>.df`, written by earlier deployments
    LegacyDf,
}

impl PayloadFormat {
    pub fn suffix(&self) -> &'static str {
        match self {
            PayloadFormat::Csv => ".csv",
            PayloadFormat::LegacyDf => ".df",
        }
    }
}

impl Default for PayloadFormat {
    fn default() -> Self {
        PayloadFormat::Csv
    }
}

/// The exact shape persisted to the metadata blob.
///
/// There is no payload field: the payload is always a separate artifact, so
/// embedding it in the metadata is structurally impossible. Deserialization
/// rejects unknown fields and fails loudly on missing ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetRecord {
    pub name: String,
    pub description: String,
    pub kind: String,
    pub roles: ColumnRoles,
    /// Construction-time row sample, as CSV text
    pub sample_csv: Option<String>,
    /// Fitted pipeline statistics, if the dataset was saved after derivation
    pub preprocessor: Option<Preprocessor>,
    /// Which suffix the payload artifact was written under
    pub payload_format: PayloadFormat,
}

impl DatasetRecord {
    /// Capture a dataset's persistable state. The payload is deliberately
    /// not part of the capture.
    pub fn from_dataset(dataset: &Dataset, payload_format: PayloadFormat) -> Result<Self> {
        let sample_csv = match dataset.sample() {
            Some(df) => Some(dataframe_to_csv_string(df)?),
            None => None,
        };

        Ok(Self {
            name: dataset.name().to_string(),
            description: dataset.description().to_string(),
            kind: dataset.kind().to_string(),
            roles: dataset.roles().clone(),
            sample_csv,
            preprocessor: dataset.preprocessor().cloned(),
            payload_format,
        })
    }

    /// Rebuild a metadata-only dataset from this record.
    pub fn into_dataset(self) -> Result<Dataset> {
        let sample = match &self.sample_csv {
            Some(text) => Some(dataframe_from_csv_str(text)?),
            None => None,
        };

        Dataset::from_parts(
            self.name,
            self.description,
            self.kind,
            self.roles,
            sample,
            self.preprocessor,
        )
    }

    /// Key of the payload artifact belonging to this record.
    pub fn payload_key(&self) -> String {
        format!("{}{}", self.name, self.payload_format.suffix())
    }
}
