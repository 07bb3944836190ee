//! MySQL client adapter.
//!
//! Every public operation opens a fresh connection, runs its statement(s),
//! and closes the connection before returning. There is no pooling and no
//! transaction spanning calls; the ingestion pipeline is the only caller
//! that holds one connection across multiple statements, via [`connect`].
//!
//! Statements run unprepared (`Executor::fetch_all`/`execute` on raw SQL)
//! because model-generated DDL and dump statements do not always survive
//! preparation.

use crate::db::types::{column_names, row_to_record};
use crate::error::{AppError, AppResult};
use crate::models::ConnectionParams;
use serde_json::Value as JsonValue;
use sqlx::mysql::{MySqlConnectOptions, MySqlRow};
use sqlx::{Column, Connection, Executor, MySqlConnection};
use tracing::debug;

/// MySQL system schemas hidden from database listings.
const SYSTEM_SCHEMAS: [&str; 4] = ["information_schema", "performance_schema", "mysql", "sys"];

/// Columns and rows of one executed statement.
///
/// `columns` comes from row metadata, or from preparing the statement when
/// it returned no rows, so a SELECT matching nothing still reports its
/// header names; only statements without a result set (DDL) report no
/// columns. Every row record has exactly one value per column.
#[derive(Debug, Clone)]
pub struct QuerySet {
    pub columns: Vec<String>,
    pub rows: Vec<serde_json::Map<String, JsonValue>>,
}

/// Quote a MySQL identifier with backticks.
pub fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Open a fresh connection for the given parameters.
///
/// Used internally by every adapter operation and by the ingestion pipeline
/// for its single batch connection.
pub(crate) async fn connect(params: &ConnectionParams) -> AppResult<MySqlConnection> {
    let mut options = MySqlConnectOptions::new()
        .host(&params.host)
        .username(&params.user)
        .password(&params.password);
    if let Some(database) = &params.database {
        options = options.database(database);
    }

    MySqlConnection::connect_with(&options)
        .await
        .map_err(|e| AppError::connection(e.to_string()))
}

/// Thin pass-through to the MySQL driver.
pub struct DbClient;

impl DbClient {
    /// Execute one statement and fetch all rows.
    pub async fn run_query(params: &ConnectionParams, sql: &str) -> AppResult<QuerySet> {
        debug!(sql = %sql, "Executing query");
        let mut conn = connect(params).await?;
        let outcome = match (&mut conn).fetch_all(sql).await {
            Ok(rows) => {
                let columns = match rows.first() {
                    Some(row) => column_names(row),
                    // zero rows carry no metadata; recover headers from a prepare
                    None => described_columns(&mut conn, sql).await,
                };
                let records = rows.iter().map(row_to_record).collect();
                Ok(QuerySet {
                    columns,
                    rows: records,
                })
            }
            Err(e) => Err(AppError::from(e)),
        };
        let _ = conn.close().await;
        outcome
    }

    /// Execute one statement and return the driver-reported affected-row count.
    pub async fn execute(params: &ConnectionParams, sql: &str) -> AppResult<u64> {
        debug!(sql = %sql, "Executing statement");
        let mut conn = connect(params).await?;
        let result = (&mut conn).execute(sql).await;
        let _ = conn.close().await;

        Ok(result.map_err(AppError::from)?.rows_affected())
    }

    /// List databases on the server, excluding the built-in system schemas.
    pub async fn list_databases(params: &ConnectionParams) -> AppResult<Vec<String>> {
        let mut conn = connect(params).await?;
        let fetched = (&mut conn).fetch_all("SHOW DATABASES").await;
        let _ = conn.close().await;

        let rows = fetched.map_err(AppError::from)?;
        let names = first_column(&rows)?;
        Ok(names
            .into_iter()
            .filter(|name| !SYSTEM_SCHEMAS.contains(&name.as_str()))
            .collect())
    }

    /// List tables in the target database.
    pub async fn list_tables(params: &ConnectionParams) -> AppResult<Vec<String>> {
        if params.database.is_none() {
            return Err(AppError::invalid_input(
                "A database must be selected to list tables.",
            ));
        }
        let mut conn = connect(params).await?;
        let fetched = (&mut conn).fetch_all("SHOW TABLES").await;
        let _ = conn.close().await;

        first_column(&fetched.map_err(AppError::from)?)
    }

    /// Create a database. Fails if it already exists.
    pub async fn create_database(params: &ConnectionParams, name: &str) -> AppResult<()> {
        let sql = format!("CREATE DATABASE {}", quote_ident(name));
        Self::execute(&params.without_database(), &sql).await?;
        Ok(())
    }

    /// Create a database only if it does not already exist.
    pub async fn ensure_database(params: &ConnectionParams, name: &str) -> AppResult<()> {
        let sql = format!("CREATE DATABASE IF NOT EXISTS {}", quote_ident(name));
        Self::execute(&params.without_database(), &sql).await?;
        Ok(())
    }

    /// Drop a table from the target database.
    pub async fn drop_table(params: &ConnectionParams, table: &str) -> AppResult<()> {
        let sql = format!("DROP TABLE {}", quote_ident(table));
        Self::execute(params, &sql).await?;
        Ok(())
    }
}

/// Column names recovered by preparing the statement, for result sets with
/// no rows to take metadata from. Statements that cannot be prepared report
/// no columns.
async fn described_columns(conn: &mut MySqlConnection, sql: &str) -> Vec<String> {
    match (&mut *conn).describe(sql).await {
        Ok(described) => described
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// Decode the first column of each row as a string.
fn first_column(rows: &[MySqlRow]) -> AppResult<Vec<String>> {
    use sqlx::Row;
    rows.iter()
        .map(|row| row.try_get::<String, _>(0).map_err(AppError::from))
        .collect()
}
