//! Export helper for SPARQL Analytics.
//!
//! Serializes a [`QueryResult`] to CSV, JSON (array of records) or a
//! single-sheet Excel workbook. Everything is produced in memory so the web
//! shell can hand the bytes straight to a download response; nothing is
//! ever written to the local filesystem.

use rust_xlsxwriter::{Format, Workbook};
use sparql_analytics_model::{ExportFormat, QueryResult};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Exporting a result without a header is refused for every format.
    #[error("the result has no columns to export")]
    NoColumns,
    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV buffer error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV output was not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Excel serialization failed: {0}")]
    Excel(#[from] rust_xlsxwriter::XlsxError),
}

/// A finished download: payload plus the response metadata it ships with.
#[derive(Debug, Clone)]
pub struct ExportPayload {
    pub bytes: Vec<u8>,
    pub media_type: &'static str,
    pub file_name: &'static str,
}

/// Serializes `result` in the requested format.
pub fn export(result: &QueryResult, format: ExportFormat) -> Result<ExportPayload, ExportError> {
    let bytes = match format {
        ExportFormat::Csv => to_csv(result)?.into_bytes(),
        ExportFormat::Json => to_json(result)?.into_bytes(),
        ExportFormat::Excel => to_xlsx(result)?,
    };
    Ok(ExportPayload {
        bytes,
        media_type: format.media_type(),
        file_name: format.file_name(),
    })
}

/// UTF-8 CSV: header row, then one record per row. Fields are quoted only
/// when they contain separators, quotes or line breaks.
pub fn to_csv(result: &QueryResult) -> Result<String, ExportError> {
    if result.columns.is_empty() {
        return Err(ExportError::NoColumns);
    }
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&result.columns)?;
    for row in &result.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    let bytes = writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

/// JSON array of objects, one per row; object keys are the column names in
/// column order (the map type preserves insertion order).
pub fn to_json(result: &QueryResult) -> Result<String, ExportError> {
    if result.columns.is_empty() {
        return Err(ExportError::NoColumns);
    }
    let records: Vec<serde_json::Value> = result
        .rows
        .iter()
        .map(|row| {
            let mut record = serde_json::Map::new();
            for (column, value) in result.columns.iter().zip(row) {
                record.insert(column.clone(), serde_json::Value::String(value.clone()));
            }
            serde_json::Value::Object(record)
        })
        .collect();
    Ok(serde_json::to_string(&records)?)
}

/// Single-sheet workbook: bold header row plus data rows, written to an
/// in-memory byte buffer.
pub fn to_xlsx(result: &QueryResult) -> Result<Vec<u8>, ExportError> {
    if result.columns.is_empty() {
        return Err(ExportError::NoColumns);
    }
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let header = Format::new().set_bold();
    for (col, name) in result.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, name, &header)?;
    }
    for (row_idx, row) in result.rows.iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            worksheet.write_string(row_idx as u32 + 1, col as u16, value)?;
        }
    }
    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sample() -> QueryResult {
        QueryResult::ok(
            vec!["name".to_owned(), "value".to_owned()],
            vec![
                vec!["alpha".to_owned(), "1".to_owned()],
                vec!["beta, with comma".to_owned(), "2".to_owned()],
            ],
            Duration::ZERO,
        )
    }

    #[test]
    fn csv_has_a_header_and_quotes_only_where_needed() {
        let csv = to_csv(&sample()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("name,value"));
        assert_eq!(lines.next(), Some("alpha,1"));
        assert_eq!(lines.next(), Some("\"beta, with comma\",2"));
    }

    #[test]
    fn repeated_exports_are_byte_identical() {
        let result = sample();
        assert_eq!(to_csv(&result).unwrap(), to_csv(&result).unwrap());
        assert_eq!(to_json(&result).unwrap(), to_json(&result).unwrap());
    }

    #[test]
    fn json_round_trips_values_in_column_order() {
        let result = sample();
        let json = to_json(&result).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let records = parsed.as_array().unwrap();
        assert_eq!(records.len(), result.rows.len());
        for (record, row) in records.iter().zip(&result.rows) {
            let object = record.as_object().unwrap();
            let keys: Vec<&String> = object.keys().collect();
            assert_eq!(keys, result.columns.iter().collect::<Vec<_>>());
            let values: Vec<&str> = object.values().map(|v| v.as_str().unwrap()).collect();
            assert_eq!(values, row.iter().map(String::as_str).collect::<Vec<_>>());
        }
    }

    #[test]
    fn excel_payload_is_a_zip_container() {
        let bytes = to_xlsx(&sample()).unwrap();
        // xlsx is a zip archive, which always starts with "PK".
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn empty_column_sets_fail_loudly_for_every_format() {
        let empty = QueryResult::ok(Vec::new(), Vec::new(), Duration::ZERO);
        for format in ExportFormat::ALL {
            assert!(matches!(
                export(&empty, format),
                Err(ExportError::NoColumns)
            ));
        }
    }

    #[test]
    fn payload_metadata_matches_the_format() {
        let payload = export(&sample(), ExportFormat::Json).unwrap();
        assert_eq!(payload.media_type, "application/json");
        assert_eq!(payload.file_name, "query_results.json");
        assert!(!payload.bytes.is_empty());
    }
}
