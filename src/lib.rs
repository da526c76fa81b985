//! tabstore - Dataset management for tabular modeling data
//!
//! This crate tracks named tabular datasets together with their modeling
//! metadata and persists both to a key-addressed blob store:
//! - Column-role metadata (categorical/continuous kinds, x/t/y roles,
//!   excluded columns) with role-partitioned views over the payload
//! - A fit-once preprocessing pipeline (label encoding, most-frequent and
//!   mean imputation, standardization) derived from the payload
//! - Save/load/list protocols that keep metadata and payload as separate
//!   artifacts
//!
//! # Modules
//!
//! - [`dataset`] - Dataset records, column roles, role-partitioned views
//! - [`preprocessing`] - Fit-once transformation pipeline and its stages
//! - [`store`] - Blob-store persistence: backends, envelope, protocols

// Core error handling
pub mod error;

// Dataset records and roles
pub mod dataset;

// Preprocessing pipeline
pub mod preprocessing;

// Persistence
pub mod store;

// CSV helpers shared by store and records
pub mod utils;

pub use error::{Result, TabstoreError};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{Result, TabstoreError};

    // Datasets
    pub use crate::dataset::{
        filtered_columns, ColumnRoles, Dataset, DatasetOptions, DatasetRecord, PayloadFormat,
    };

    // Preprocessing
    pub use crate::preprocessing::{ImputeStrategy, Imputer, LabelEncoder, Preprocessor, Scaler};

    // Persistence
    pub use crate::store::{
        BlobStore, DatasetStore, DirBlobStore, MemoryBlobStore, MetadataFormat, StoreConfig,
    };
}
