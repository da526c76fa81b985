//! Key-addressed blob storage backends

use crate::error::{Result, TabstoreError};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

/// Key-addressed blob store the dataset store persists through.
///
/// Transport failures (missing key, unreachable backend) are surfaced as-is;
/// the dataset store performs no retries and no translation.
pub trait BlobStore {
    /// Enumerate every key in the store, payload artifacts included.
    fn list_keys(&self) -> Result<Vec<String>>;

    /// Read an opaque blob.
    fn get_bytes(&self, key: &str) -> Result<Vec<u8>>;

    /// Write an opaque blob.
    fn put_bytes(&self, key: &str, data: &[u8]) -> Result<()>;

    /// Read a text blob.
    fn get_text(&self, key: &str) -> Result<String>;

    /// Write a text blob with a content type hint.
    fn put_text(&self, key: &str, text: &str, content_type: &str) -> Result<()>;
}

/// In-memory backend for tests and ephemeral use.
///
/// The mutex exists only to offer `&self` methods through the trait; all
/// access in this crate is single-threaded.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn list_keys(&self) -> Result<Vec<String>> {
        let blobs = self
            .blobs
            .lock()
            .map_err(|e| TabstoreError::StoreError(e.to_string()))?;
        let mut keys: Vec<String> = blobs.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    fn get_bytes(&self, key: &str) -> Result<Vec<u8>> {
        let blobs = self
            .blobs
            .lock()
            .map_err(|e| TabstoreError::StoreError(e.to_string()))?;
        blobs
            .get(key)
            .cloned()
            .ok_or_else(|| TabstoreError::StoreError(format!("key not found: {key}")))
    }

    fn put_bytes(&self, key: &str, data: &[u8]) -> Result<()> {
        let mut blobs = self
            .blobs
            .lock()
            .map_err(|e| TabstoreError::StoreError(e.to_string()))?;
        blobs.insert(key.to_string(), data.to_vec());
        Ok(())
    }

    fn get_text(&self, key: &str) -> Result<String> {
        let bytes = self.get_bytes(key)?;
        String::from_utf8(bytes).map_err(|e| TabstoreError::StoreError(e.to_string()))
    }

    fn put_text(&self, key: &str, text: &str, _content_type: &str) -> Result<()> {
        self.put_bytes(key, text.as_bytes())
    }
}

/// Local directory backend: one file per key under a root directory.
pub struct DirBlobStore {
    root: PathBuf,
}

impl DirBlobStore {
    /// Open (creating if needed) a directory-backed store.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        // Keys are flat names; anything path-like would escape the root.
        if key.is_empty() || key.contains('/') || key.contains('\\') || key.contains("..") {
            return Err(TabstoreError::StoreError(format!(
                "invalid blob key: {key}"
            )));
        }
        Ok(self.root.join(key))
    }
}

impl BlobStore for DirBlobStore {
    fn list_keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    keys.push(name.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn get_bytes(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.key_path(key)?;
        fs::read(&path)
            .map_err(|e| TabstoreError::StoreError(format!("failed to read {key}: {e}")))
    }

    fn put_bytes(&self, key: &str, data: &[u8]) -> Result<()> {
        let path = self.key_path(key)?;
        fs::write(&path, data)
            .map_err(|e| TabstoreError::StoreError(format!("failed to write {key}: {e}")))
    }

    fn get_text(&self, key: &str) -> Result<String> {
        let bytes = self.get_bytes(key)?;
        String::from_utf8(bytes).map_err(|e| TabstoreError::StoreError(e.to_string()))
    }

    fn put_text(&self, key: &str, text: &str, _content_type: &str) -> Result<()> {
        self.put_bytes(key, text.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryBlobStore::new();
        store.put_bytes("a", b"hello").unwrap();
        store.put_text("b", "world", "text/plain").unwrap();

        assert_eq!(store.get_bytes("a").unwrap(), b"hello");
        assert_eq!(store.get_text("b").unwrap(), "world");
        assert_eq!(store.list_keys().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_memory_store_missing_key() {
        let store = MemoryBlobStore::new();
        assert!(matches!(
            store.get_bytes("ghost"),
            Err(TabstoreError::StoreError(_))
        ));
    }

    #[test]
    fn test_dir_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirBlobStore::new(dir.path()).unwrap();

        store.put_bytes("census", b"\x01\x02").unwrap();
        store.put_text("census.csv", "a,b\n1,2\n", "text/csv").unwrap();

        assert_eq!(store.get_bytes("census").unwrap(), vec![1u8, 2]);
        assert_eq!(store.get_text("census.csv").unwrap(), "a,b\n1,2\n");
        assert_eq!(
            store.list_keys().unwrap(),
            vec!["census", "census.csv"]
        );
    }

    #[test]
    fn test_dir_store_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirBlobStore::new(dir.path()).unwrap();
        assert!(store.put_bytes("../escape", b"x").is_err());
    }
}
