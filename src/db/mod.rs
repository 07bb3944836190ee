//! Database access layer.
//!
//! This module provides the MySQL client adapter and schema introspection:
//! - One fresh connection per operation, closed before returning
//! - Raw (unprepared) statement execution for model-generated SQL
//! - Row decoding into JSON records keyed by column name

pub mod client;
pub mod introspect;
pub mod types;

pub use client::{DbClient, QuerySet, quote_ident};
pub use introspect::SchemaIntrospector;
