//! Data models for the NL2SQL server.
//!
//! Every type here is a request-scoped value object: created at the start of
//! a request handler, gone when the handler returns. Nothing is cached or
//! persisted between requests.

pub mod connection;
pub mod ingest;
pub mod query;
pub mod schema;

// Re-export commonly used types
pub use connection::ConnectionParams;
pub use ingest::{IngestReport, IngestionAnalysis, LogEntry, LogKind, TableSpec};
pub use query::QueryOutcome;
pub use schema::TableSchema;
