//! Route handlers.
//!
//! All routes accept form-encoded POST bodies (the upload route is
//! multipart) and answer JSON. Missing required fields short-circuit into
//! `{"error": ...}` before any database or model call; the password field is
//! the one field allowed to be empty.

use crate::db::DbClient;
use crate::error::{AppError, AppResult};
use crate::models::{ConnectionParams, IngestReport, QueryOutcome};
use crate::service::{IngestService, QueryService};
use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Form, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Shared handler state: the two request-scoped services. Holds no
/// per-request data and no database connections.
pub struct AppState {
    pub query: QueryService,
    pub ingest: IngestService,
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/fetch-databases", post(fetch_databases))
        .route("/fetch-tables", post(fetch_tables))
        .route("/drop-table", post(drop_table))
        .route("/create-database", post(create_database))
        .route("/execute", post(execute))
        .route("/download", post(download))
        .route("/upload-sql", post(upload_sql))
        .with_state(state)
}

const MISSING_DETAILS: &str = "Please provide all the details.";
const MISSING_SERVER_DETAILS: &str = "Please provide user and host information.";

/// Reject absent or blank required fields before anything touches the network.
fn require(field: Option<String>, message: &str) -> AppResult<String> {
    match field {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::invalid_input(message)),
    }
}

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ServerForm {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DatabaseForm {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub database: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DropTableForm {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub table_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct QuestionForm {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DownloadForm {
    #[serde(default)]
    pub csv_data: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DatabasesResponse {
    pub databases: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TablesResponse {
    pub tables: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub message: String,
    pub details: IngestReport,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn fetch_databases(
    State(_state): State<Arc<AppState>>,
    Form(form): Form<ServerForm>,
) -> AppResult<Json<DatabasesResponse>> {
    let user = require(form.user, MISSING_SERVER_DETAILS)?;
    let host = require(form.host, MISSING_SERVER_DETAILS)?;
    let params = ConnectionParams::server(host, user, form.password.unwrap_or_default());

    let databases = DbClient::list_databases(&params).await?;
    Ok(Json(DatabasesResponse { databases }))
}

async fn fetch_tables(
    State(_state): State<Arc<AppState>>,
    Form(form): Form<DatabaseForm>,
) -> AppResult<Json<TablesResponse>> {
    let user = require(form.user, MISSING_DETAILS)?;
    let host = require(form.host, MISSING_DETAILS)?;
    let database = require(form.database, MISSING_DETAILS)?;
    let params =
        ConnectionParams::for_database(host, user, form.password.unwrap_or_default(), database);

    let tables = DbClient::list_tables(&params).await?;
    Ok(Json(TablesResponse { tables }))
}

async fn drop_table(
    State(_state): State<Arc<AppState>>,
    Form(form): Form<DropTableForm>,
) -> AppResult<Json<MessageResponse>> {
    let user = require(form.user, MISSING_DETAILS)?;
    let host = require(form.host, MISSING_DETAILS)?;
    let database = require(form.database, MISSING_DETAILS)?;
    let table_name = require(form.table_name, MISSING_DETAILS)?;
    let params =
        ConnectionParams::for_database(host, user, form.password.unwrap_or_default(), database);

    DbClient::drop_table(&params, &table_name).await?;
    info!(table = %table_name, "Table dropped");
    Ok(Json(MessageResponse {
        message: format!("Table '{}' dropped successfully.", table_name),
    }))
}

async fn create_database(
    State(_state): State<Arc<AppState>>,
    Form(form): Form<DatabaseForm>,
) -> AppResult<Json<MessageResponse>> {
    let user = require(form.user, MISSING_DETAILS)?;
    let host = require(form.host, MISSING_DETAILS)?;
    let database = require(form.database, MISSING_DETAILS)?;
    let params = ConnectionParams::server(host, user, form.password.unwrap_or_default());

    DbClient::create_database(&params, &database).await?;
    info!(database = %database, "Database created");
    Ok(Json(MessageResponse {
        message: format!("Database '{}' created successfully.", database),
    }))
}

async fn execute(
    State(state): State<Arc<AppState>>,
    Form(form): Form<QuestionForm>,
) -> AppResult<Json<QueryOutcome>> {
    let user = require(form.user, MISSING_DETAILS)?;
    let host = require(form.host, MISSING_DETAILS)?;
    let database = require(form.database, MISSING_DETAILS)?;
    let question = require(form.question, MISSING_DETAILS)?;
    let params =
        ConnectionParams::for_database(host, user, form.password.unwrap_or_default(), database);

    let outcome = state.query.run_question(&params, &question).await?;
    Ok(Json(outcome))
}

async fn download(Form(form): Form<DownloadForm>) -> Response {
    let csv_data = form.csv_data.unwrap_or_default();
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"query_results.csv\"",
            ),
        ],
        csv_data,
    )
        .into_response()
}

async fn upload_sql(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> AppResult<Json<IngestResponse>> {
    let upload = read_upload(multipart).await?;

    let user = require(upload.user, MISSING_DETAILS)?;
    let host = require(upload.host, MISSING_DETAILS)?;
    let database = require(upload.database, MISSING_DETAILS)?;
    let script = validate_sql_file(upload.file_name.as_deref(), upload.file.as_deref())?;
    let params =
        ConnectionParams::for_database(host, user, upload.password.unwrap_or_default(), database);

    let report = state.ingest.ingest(&params, &script).await?;
    let message = format!(
        "SQL file processed: {} table(s) created, {} row(s) inserted.",
        report.tables_created.len(),
        report.total_inserts_executed
    );
    Ok(Json(IngestResponse {
        message,
        details: report,
    }))
}

// ---------------------------------------------------------------------------
// Upload handling
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct SqlUpload {
    user: Option<String>,
    password: Option<String>,
    host: Option<String>,
    database: Option<String>,
    file_name: Option<String>,
    file: Option<Vec<u8>>,
}

async fn read_upload(mut multipart: Multipart) -> AppResult<SqlUpload> {
    let mut upload = SqlUpload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::invalid_input(format!("Invalid upload: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "user" => upload.user = Some(read_text(field).await?),
            "password" => upload.password = Some(read_text(field).await?),
            "host" => upload.host = Some(read_text(field).await?),
            "database" => upload.database = Some(read_text(field).await?),
            "file" => {
                upload.file_name = field.file_name().map(String::from);
                upload.file = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::invalid_input(format!("Invalid upload: {}", e)))?
                        .to_vec(),
                );
            }
            _ => {}
        }
    }

    Ok(upload)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::invalid_input(format!("Invalid upload: {}", e)))
}

/// Check the upload before the language model sees it: `.sql` extension,
/// non-empty, valid UTF-8.
fn validate_sql_file(file_name: Option<&str>, content: Option<&[u8]>) -> AppResult<String> {
    let name = file_name.ok_or_else(|| AppError::invalid_input("Please upload a .sql file."))?;
    let is_sql = name
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("sql"));
    if !is_sql {
        return Err(AppError::invalid_input("Please upload a .sql file."));
    }

    let bytes = content.ok_or_else(|| AppError::invalid_input("Please upload a .sql file."))?;
    let text = String::from_utf8(bytes.to_vec())
        .map_err(|_| AppError::invalid_input("The uploaded file is not valid UTF-8 text."))?;
    if text.trim().is_empty() {
        return Err(AppError::invalid_input("The uploaded file is empty."));
    }
    Ok(text)
}
