//! Error types for the tabstore dataset layer

use thiserror::Error;

/// Result type alias for tabstore operations
pub type Result<T> = std::result::Result<T, TabstoreError>;

/// Main error type for the tabstore crate
#[derive(Error, Debug)]
pub enum TabstoreError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Preprocessing pipeline not fitted")]
    PipelineNotFitted,

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unsupported metadata format: expected version {expected}, got {actual}")]
    FormatVersionMismatch { expected: u32, actual: u32 },
}

impl From<polars::error::PolarsError> for TabstoreError {
    fn from(err: polars::error::PolarsError) -> Self {
        TabstoreError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for TabstoreError {
    fn from(err: serde_json::Error) -> Self {
        TabstoreError::SerializationError(err.to_string())
    }
}

impl From<bincode::Error> for TabstoreError {
    fn from(err: bincode::Error) -> Self {
        TabstoreError::SerializationError(err.to_string())
    }
}
