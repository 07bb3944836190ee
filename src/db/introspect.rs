//! Schema introspection.
//!
//! Lists the user tables of the target database and their column names, the
//! only schema facts the prompt builder needs. The whole pass runs on a
//! single connection, closed before returning.

use crate::db::client::{connect, quote_ident};
use crate::error::{AppError, AppResult};
use crate::models::{ConnectionParams, TableSchema};
use sqlx::{Connection, Executor, Row};
use tracing::debug;

const LIST_TABLES: &str = "SELECT table_name \
     FROM information_schema.tables \
     WHERE table_schema = ? AND table_type = 'BASE TABLE' \
     ORDER BY table_name";

pub struct SchemaIntrospector;

impl SchemaIntrospector {
    /// Introspect the target database: every table with its ordered columns.
    pub async fn introspect(params: &ConnectionParams) -> AppResult<Vec<TableSchema>> {
        let database = params.database.as_deref().ok_or_else(|| {
            AppError::invalid_input("A database must be selected for schema introspection.")
        })?;

        let mut conn = connect(params).await?;
        let result = Self::introspect_on(&mut conn, database).await;
        let _ = conn.close().await;
        result
    }

    async fn introspect_on(
        conn: &mut sqlx::MySqlConnection,
        database: &str,
    ) -> AppResult<Vec<TableSchema>> {
        let table_rows = sqlx::query(LIST_TABLES)
            .bind(database)
            .fetch_all(&mut *conn)
            .await
            .map_err(AppError::from)?;

        let mut schema = Vec::with_capacity(table_rows.len());
        for row in &table_rows {
            let table: String = row.try_get(0).map_err(AppError::from)?;
            // SHOW COLUMNS reports `Field` first; column order matches the table definition
            let show = format!("SHOW COLUMNS FROM {}", quote_ident(&table));
            let column_rows = (&mut *conn).fetch_all(show.as_str()).await?;
            let columns = column_rows
                .iter()
                .map(|r| r.try_get::<String, _>(0).map_err(AppError::from))
                .collect::<AppResult<Vec<String>>>()?;
            schema.push(TableSchema::new(table, columns));
        }

        debug!(database = %database, tables = schema.len(), "Introspected schema");
        Ok(schema)
    }
}
