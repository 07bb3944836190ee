//! Query result models.

use serde::Serialize;
use serde_json::Value as JsonValue;

/// The answer to one natural-language question.
///
/// `result` holds one record per row, keyed by column name in result-set
/// order; `csv` is the same data as a downloadable CSV payload. An empty
/// `result` is a successful empty result set, not an error.
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutcome {
    pub sql_query: String,
    pub result: Vec<serde_json::Map<String, JsonValue>>,
    pub columns: Vec<String>,
    pub csv: String,
}
