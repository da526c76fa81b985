//! Checksummed container for metadata blobs

use crate::dataset::DatasetRecord;
use crate::error::{Result, TabstoreError};
use serde::{Deserialize, Serialize};

/// Codec for the record bytes inside the envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetadataFormat {
    /// Binary format using bincode (efficient)
    Binary,
    /// JSON format (portable, human-readable)
    Json,
}

impl Default for MetadataFormat {
    fn default() -> Self {
        MetadataFormat::Binary
    }
}

/// Container written to the metadata blob: magic bytes and a format version
/// for loud rejection of foreign or stale blobs, a record-format tag so the
/// reader needs no out-of-band knowledge, and a checksum over the record
/// bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataEnvelope {
    magic: [u8; 4],
    format_version: u32,
    record_format: MetadataFormat,
    record_data: Vec<u8>,
    checksum: u64,
}

impl MetadataEnvelope {
    /// Magic bytes for tabstore dataset metadata blobs
    const MAGIC: [u8; 4] = *b"TSDS";
    /// Current envelope format version
    const VERSION: u32 = 1;

    /// Serialize `record` into envelope bytes.
    pub fn encode(record: &DatasetRecord, format: MetadataFormat) -> Result<Vec<u8>> {
        let record_data = match format {
            MetadataFormat::Binary => bincode::serialize(record)?,
            MetadataFormat::Json => serde_json::to_vec(record)?,
        };

        let envelope = Self {
            magic: Self::MAGIC,
            format_version: Self::VERSION,
            record_format: format,
            checksum: Self::compute_checksum(&record_data),
            record_data,
        };

        Ok(bincode::serialize(&envelope)?)
    }

    /// Decode envelope bytes back into a record, verifying magic, version,
    /// and checksum before touching the record bytes.
    pub fn decode(bytes: &[u8]) -> Result<DatasetRecord> {
        let envelope: Self = bincode::deserialize(bytes).map_err(|e| {
            TabstoreError::SerializationError(format!("not a dataset metadata blob: {e}"))
        })?;

        if envelope.magic != Self::MAGIC {
            return Err(TabstoreError::SerializationError(
                "not a dataset metadata blob: bad magic bytes".to_string(),
            ));
        }

        if envelope.format_version != Self::VERSION {
            return Err(TabstoreError::FormatVersionMismatch {
                expected: Self::VERSION,
                actual: envelope.format_version,
            });
        }

        if Self::compute_checksum(&envelope.record_data) != envelope.checksum {
            return Err(TabstoreError::SerializationError(
                "metadata blob checksum mismatch".to_string(),
            ));
        }

        let record = match envelope.record_format {
            MetadataFormat::Binary => bincode::deserialize(&envelope.record_data)?,
            MetadataFormat::Json => serde_json::from_slice(&envelope.record_data)?,
        };

        Ok(record)
    }

    /// FNV-1a hash over the record bytes
    fn compute_checksum(data: &[u8]) -> u64 {
        const FNV_OFFSET: u64 = 14695981039346656037;
        const FNV_PRIME: u64 = 1099511628211;

        let mut hash = FNV_OFFSET;
        for byte in data {
            hash ^= *byte as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{ColumnRoles, PayloadFormat};

    fn sample_record() -> DatasetRecord {
        DatasetRecord {
            name: "census".to_string(),
            description: "census dataset".to_string(),
            kind: "real".to_string(),
            roles: ColumnRoles {
                categorical: vec!["city".to_string()],
                continuous: vec!["age".to_string()],
                x: vec!["city".to_string()],
                t: vec!["age".to_string()],
                y: None,
                removed: vec![],
            },
            sample_csv: None,
            preprocessor: None,
            payload_format: PayloadFormat::Csv,
        }
    }

    #[test]
    fn test_binary_round_trip() {
        let record = sample_record();
        let bytes = MetadataEnvelope::encode(&record, MetadataFormat::Binary).unwrap();
        let decoded = MetadataEnvelope::decode(&bytes).unwrap();
        assert_eq!(decoded.name, "census");
        assert_eq!(decoded.roles, record.roles);
    }

    #[test]
    fn test_json_round_trip() {
        let record = sample_record();
        let bytes = MetadataEnvelope::encode(&record, MetadataFormat::Json).unwrap();
        let decoded = MetadataEnvelope::decode(&bytes).unwrap();
        assert_eq!(decoded.kind, "real");
    }

    #[test]
    fn test_corrupt_blob_is_rejected() {
        let record = sample_record();
        let mut bytes = MetadataEnvelope::encode(&record, MetadataFormat::Binary).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        assert!(MetadataEnvelope::decode(&bytes).is_err());
    }

    #[test]
    fn test_garbage_is_not_a_blob() {
        let result = MetadataEnvelope::decode(b"definitely not an envelope");
        assert!(matches!(
            result,
            Err(TabstoreError::SerializationError(_))
        ));
    }
}
