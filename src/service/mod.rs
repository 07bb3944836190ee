//! Request-scoped services.
//!
//! - `query`: answers one natural-language question against one database
//! - `ingest`: replays an uploaded SQL dump with per-statement error isolation
//! - `export`: CSV rendering of query results

pub mod export;
pub mod ingest;
pub mod query;

pub use ingest::IngestService;
pub use query::QueryService;
