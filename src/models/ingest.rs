//! SQL dump ingestion models.
//!
//! `IngestionAnalysis` is parsed from the language model's structured output
//! and must validate before anything executes; the model is an untrusted
//! extractor. `LogEntry` records every attempted statement so a caller can
//! detect partial failure in an otherwise successful response.

use serde::{Deserialize, Serialize};

/// One extracted `CREATE TABLE` statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSpec {
    pub table_name: String,
    pub columns: Vec<String>,
    pub create_statement: String,
}

/// Structured description of an uploaded SQL script.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionAnalysis {
    pub tables: Vec<TableSpec>,
    pub inserts: Vec<String>,
}

impl IngestionAnalysis {
    /// True when the script yielded neither schema nor data statements.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.inserts.is_empty()
    }
}

/// Classification of an execution log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Success,
    Info,
    Error,
    Insert,
}

/// One entry in the ordered ingestion execution log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(rename = "type")]
    pub kind: LogKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl LogEntry {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: LogKind::Success,
            message: message.into(),
            details: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: LogKind::Info,
            message: message.into(),
            details: None,
        }
    }

    pub fn error(message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            kind: LogKind::Error,
            message: message.into(),
            details,
        }
    }

    pub fn insert(message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            kind: LogKind::Insert,
            message: message.into(),
            details,
        }
    }
}

/// Outcome of replaying one uploaded SQL script.
///
/// Returned even when individual statements failed; `execution_log` is the
/// full record, in the order statements were attempted.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub tables_created: Vec<String>,
    pub total_inserts_executed: u64,
    pub execution_log: Vec<LogEntry>,
}

impl IngestReport {
    /// Count of error-kind entries in the execution log.
    pub fn error_count(&self) -> usize {
        self.execution_log
            .iter()
            .filter(|e| e.kind == LogKind::Error)
            .count()
    }
}
