//! Introspected schema information.

use serde::Serialize;

/// One user table and its column names, in catalog order.
///
/// Built fresh for every query request and discarded once the system prompt
/// has been rendered.
#[derive(Debug, Clone, Serialize)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<String>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }
}
