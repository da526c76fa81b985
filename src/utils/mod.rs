//! CSV round-trip helpers for payload and sample artifacts

use crate::error::{Result, TabstoreError};
use polars::prelude::*;
use std::io::Cursor;

/// Parse a UTF-8 CSV string (header row present) into a DataFrame.
pub fn dataframe_from_csv_str(text: &str) -> Result<DataFrame> {
    let cursor = Cursor::new(text.as_bytes().to_vec());

    let reader = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .into_reader_with_file_handle(cursor);

    reader
        .finish()
        .map_err(|e| TabstoreError::DataError(e.to_string()))
}

/// Serialize a DataFrame to CSV text with a header row.
pub fn dataframe_to_csv_string(df: &DataFrame) -> Result<String> {
    let mut df = df.clone();
    let mut buf: Vec<u8> = Vec::new();

    CsvWriter::new(&mut buf)
        .include_header(true)
        .finish(&mut df)
        .map_err(|e| TabstoreError::DataError(e.to_string()))?;

    String::from_utf8(buf).map_err(|e| TabstoreError::DataError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_round_trip() {
        let df = df!(
            "city" => &["NYC", "LA", "SF"],
            "age" => &[25.0, 30.0, 35.0],
        )
        .unwrap();

        let text = dataframe_to_csv_string(&df).unwrap();
        let reloaded = dataframe_from_csv_str(&text).unwrap();

        assert_eq!(reloaded.height(), 3);
        assert_eq!(reloaded.width(), 2);
        assert_eq!(
            reloaded.get_column_names_str(),
            df.get_column_names_str()
        );
    }

    #[test]
    fn test_csv_preserves_nulls() {
        let df = DataFrame::new(vec![Column::new(
            "a".into(),
            &[Some(1.0), None, Some(3.0)],
        )])
        .unwrap();

        let text = dataframe_to_csv_string(&df).unwrap();
        let reloaded = dataframe_from_csv_str(&text).unwrap();

        let col = reloaded.column("a").unwrap();
        assert_eq!(col.null_count(), 1);
    }
}
