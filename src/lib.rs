//! NL2SQL Server Library
//!
//! This library backs an HTTP service that translates natural-language
//! questions into SQL queries against a user-specified MySQL/MariaDB
//! database, executes them, and returns tabular results plus a CSV export.
//! It also ingests uploaded SQL dump files by extracting schema and data
//! statements via a language model and replaying them with per-statement
//! error isolation.

pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod llm;
pub mod models;
pub mod service;

pub use config::Config;
pub use error::{AppError, AppResult};
