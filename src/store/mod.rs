//! Dataset persistence over a key-addressed blob store
//!
//! Each dataset `name` maps to two artifacts: a metadata envelope under the
//! key `name` and a CSV payload under `name` plus a format suffix. Listing
//! returns only metadata keys.

mod blob;
mod envelope;

pub use blob::{BlobStore, DirBlobStore, MemoryBlobStore};
pub use envelope::{MetadataEnvelope, MetadataFormat};

use crate::dataset::{Dataset, DatasetRecord, PayloadFormat};
use crate::error::Result;
use crate::utils::{dataframe_from_csv_str, dataframe_to_csv_string};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// Configuration for a dataset store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Suffix scheme for newly written payload artifacts
    pub payload_format: PayloadFormat,
    /// Codec for the metadata blob
    pub metadata_format: MetadataFormat,
    /// Path to a credential key file, for backends that authenticate against
    /// a remote service. The bundled backends ignore it.
    pub credentials_key_file: Option<PathBuf>,
}

/// Saves, loads, and lists datasets through a [`BlobStore`] backend.
pub struct DatasetStore<B: BlobStore> {
    backend: B,
    config: StoreConfig,
}

impl<B: BlobStore> DatasetStore<B> {
    pub fn new(backend: B, config: StoreConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// All dataset names in the store. Payload artifacts are filtered out by
    /// their suffix; only metadata keys are returned.
    pub fn list(&self) -> Result<Vec<String>> {
        let keys = self.backend.list_keys()?;
        Ok(keys
            .into_iter()
            .filter(|k| {
                !k.ends_with(PayloadFormat::Csv.suffix())
                    && !k.ends_with(PayloadFormat::LegacyDf.suffix())
            })
            .collect())
    }

    /// Persist metadata and payload as two separate artifacts.
    pub fn save(&self, dataset: &Dataset) -> Result<()> {
        self.save_with(dataset, true)
    }

    /// Persist the metadata blob, and the payload artifact when
    /// `save_payload` is set and a payload is loaded.
    pub fn save_with(&self, dataset: &Dataset, save_payload: bool) -> Result<()> {
        let record = DatasetRecord::from_dataset(dataset, self.config.payload_format)?;

        let bytes = MetadataEnvelope::encode(&record, self.config.metadata_format)?;
        self.backend.put_bytes(dataset.name(), &bytes)?;
        info!(dataset = %dataset.name(), "dataset metadata saved");

        if save_payload {
            if let Some(payload) = dataset.payload() {
                let csv = dataframe_to_csv_string(payload)?;
                self.backend
                    .put_text(&record.payload_key(), &csv, "text/csv")?;
                info!(
                    dataset = %dataset.name(),
                    key = %record.payload_key(),
                    "dataset payload saved"
                );
            }
        }

        Ok(())
    }

    /// Load a dataset with its payload.
    pub fn load(&self, name: &str) -> Result<Dataset> {
        self.load_with(name, true)
    }

    /// Load the metadata blob; when `fetch_payload` is set, also fetch the
    /// payload artifact and derive the preprocessing pipeline if the stored
    /// record carried none.
    pub fn load_with(&self, name: &str, fetch_payload: bool) -> Result<Dataset> {
        let bytes = self.backend.get_bytes(name)?;
        let record = MetadataEnvelope::decode(&bytes)?;
        let payload_key = record.payload_key();

        let mut dataset = record.into_dataset()?;
        info!(dataset = %name, "dataset metadata loaded");

        if fetch_payload {
            let csv = self.backend.get_text(&payload_key)?;
            let payload = dataframe_from_csv_str(&csv)?;
            dataset.attach_payload(payload)?;
            info!(dataset = %name, key = %payload_key, "dataset payload loaded");
        }

        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::ColumnRoles;
    use polars::prelude::*;

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn sample_dataset(name: &str) -> Dataset {
        let payload = df!(
            "city" => &["NYC", "LA", "SF"],
            "age" => &[25.0, 30.0, 35.0],
        )
        .unwrap();
        let roles = ColumnRoles {
            categorical: strings(&["city"]),
            continuous: strings(&["age"]),
            x: strings(&["city", "age"]),
            t: vec![],
            y: None,
            removed: vec![],
        };
        Dataset::new(name, "city trips", "real", roles, Some(payload)).unwrap()
    }

    #[test]
    fn test_listing_excludes_payload_keys() {
        let store = DatasetStore::new(MemoryBlobStore::new(), StoreConfig::default());

        for name in ["alpha", "beta", "gamma"] {
            store.save(&sample_dataset(name)).unwrap();
        }

        // Backend holds six keys, the listing shows three
        assert_eq!(store.backend.list_keys().unwrap().len(), 6);
        let listed = store.list().unwrap();
        assert_eq!(listed, vec!["alpha", "beta", "gamma"]);
        assert!(listed.iter().all(|k| !k.ends_with(".csv")));
    }

    #[test]
    fn test_metadata_only_load() {
        let store = DatasetStore::new(MemoryBlobStore::new(), StoreConfig::default());
        store.save(&sample_dataset("census")).unwrap();

        let dataset = store.load_with("census", false).unwrap();
        assert!(dataset.payload().is_none());
        assert!(dataset.preprocessor().is_some());
        assert!(dataset.x_frame().unwrap().is_none());
    }

    #[test]
    fn test_save_without_payload_flag() {
        let store = DatasetStore::new(MemoryBlobStore::new(), StoreConfig::default());
        store
            .save_with(&sample_dataset("census"), false)
            .unwrap();

        assert_eq!(store.backend.list_keys().unwrap(), vec!["census"]);
        assert!(store.load_with("census", true).is_err());
    }

    #[test]
    fn test_legacy_payload_suffix() {
        let config = StoreConfig {
            payload_format: PayloadFormat::LegacyDf,
            ..StoreConfig::default()
        };
        let store = DatasetStore::new(MemoryBlobStore::new(), config);
        store.save(&sample_dataset("census")).unwrap();

        let keys = store.backend.list_keys().unwrap();
        assert!(keys.contains(&"census.df".to_string()));

        // The record remembers its suffix, so loading works transparently
        let dataset = store.load("census").unwrap();
        assert_eq!(dataset.payload().unwrap().height(), 3);
        assert_eq!(store.list().unwrap(), vec!["census"]);
    }

    #[test]
    fn test_json_metadata_format() {
        let config = StoreConfig {
            metadata_format: MetadataFormat::Json,
            ..StoreConfig::default()
        };
        let store = DatasetStore::new(MemoryBlobStore::new(), config);
        store.save(&sample_dataset("census")).unwrap();

        let dataset = store.load("census").unwrap();
        assert_eq!(dataset.name(), "census");
    }
}
