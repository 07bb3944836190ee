//! Error types for the NL2SQL server.
//!
//! All error types are defined with `thiserror`. Every failure surfaces as an
//! explicit `{"error": "..."}` payload on the wire; no error is fatal to the
//! serving process.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// The database could not be reached or authentication failed.
    #[error("Error connecting to database: {message}")]
    Connection { message: String },

    /// The database rejected a statement.
    #[error("Error: {message}")]
    Database {
        message: String,
        /// e.g. "42S01" for table already exists
        sql_state: Option<String>,
    },

    /// The language-model call failed or returned nothing usable.
    #[error("{message}")]
    Oracle { message: String },

    /// The language model's output did not match the expected structure.
    #[error("Invalid SQL analysis from model: {message}")]
    OracleFormat { message: String },

    /// A request was missing required fields or carried an unusable payload.
    #[error("{message}")]
    InvalidInput { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a database error with optional SQL state.
    pub fn database(message: impl Into<String>, sql_state: Option<String>) -> Self {
        Self::Database {
            message: message.into(),
            sql_state,
        }
    }

    /// Create an oracle error.
    pub fn oracle(message: impl Into<String>) -> Self {
        Self::Oracle {
            message: message.into(),
        }
    }

    /// Create an oracle output-format error.
    pub fn oracle_format(message: impl Into<String>) -> Self {
        Self::OracleFormat {
            message: message.into(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// The SQLSTATE code reported by the driver, if any.
    pub fn sql_state(&self) -> Option<&str> {
        match self {
            Self::Database { sql_state, .. } => sql_state.as_deref(),
            _ => None,
        }
    }
}

/// Convert sqlx errors: connectivity-level failures become `Connection`,
/// server-reported statement failures become `Database`.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => AppError::connection(msg.to_string()),
            sqlx::Error::Io(io_err) => AppError::connection(format!("I/O error: {}", io_err)),
            sqlx::Error::Tls(tls_err) => AppError::connection(format!("TLS error: {}", tls_err)),
            sqlx::Error::Protocol(msg) => AppError::connection(format!("protocol error: {}", msg)),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                AppError::connection("connection closed".to_string())
            }
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                AppError::database(db_err.message(), code)
            }
            sqlx::Error::ColumnDecode { index, source } => {
                AppError::internal(format!("failed to decode column {}: {}", index, source))
            }
            sqlx::Error::Decode(source) => AppError::internal(format!("decode error: {}", source)),
            _ => AppError::internal(format!("unexpected database error: {}", err)),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::oracle(format!("language model request failed: {}", err))
    }
}

/// The front end dispatches on the `error` key, not the status code, so every
/// error renders as HTTP 200 with an `{"error": "..."}` body.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (StatusCode::OK, Json(body)).into_response()
    }
}

/// Result type alias for request handling.
pub type AppResult<T> = Result<T, AppError>;
