//! CSV export of query results.

use crate::error::{AppError, AppResult};
use serde_json::Value as JsonValue;

/// Render a result set as CSV text: one header record, then one record per
/// row in column order. Quoting and escaping are the csv crate's defaults,
/// so embedded commas, quotes and newlines survive a round trip.
pub fn to_csv(
    columns: &[String],
    rows: &[serde_json::Map<String, JsonValue>],
) -> AppResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(columns)
        .map_err(|e| AppError::internal(format!("CSV encoding failed: {}", e)))?;
    for row in rows {
        let record: Vec<String> = columns.iter().map(|col| cell_text(row.get(col))).collect();
        writer
            .write_record(&record)
            .map_err(|e| AppError::internal(format!("CSV encoding failed: {}", e)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::internal(format!("CSV encoding failed: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| AppError::internal(format!("CSV output was not UTF-8: {}", e)))
}

/// Bare text for one cell: strings unquoted, nulls empty, scalars via
/// Display, structured values as compact JSON.
fn cell_text(value: Option<&JsonValue>) -> String {
    match value {
        None | Some(JsonValue::Null) => String::new(),
        Some(JsonValue::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
