//! SQL dump ingestion pipeline.
//!
//! Turns an uploaded SQL script into a best-effort sequence of applied
//! schema and data changes. The model extracts structured statements from
//! the script; its output must validate against a strict shape before any
//! statement executes. During replay, failures are isolated per statement
//! and logged rather than propagated; one malformed statement must never
//! block the rest of a batch import.

use crate::db::DbClient;
use crate::db::client::connect;
use crate::error::{AppError, AppResult};
use crate::llm::{EXTRACTION_TEMPERATURE, LlmClient, prompt, strip_code_fences};
use crate::models::{ConnectionParams, IngestReport, IngestionAnalysis, LogEntry};
use sqlx::{Connection, Executor, MySql, Transaction};
use std::future::Future;
use std::pin::Pin;
use tracing::{info, warn};

/// Longest statement preview carried in log details.
const PREVIEW_CHARS: usize = 120;

/// Executes one raw statement of a replay batch, returning the affected-row
/// count. The production implementation wraps the batch transaction; the
/// seam lets the continue-on-error loop run against a scripted runner.
pub(crate) trait StatementRunner {
    fn run<'a>(
        &'a mut self,
        sql: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<u64, sqlx::Error>> + Send + 'a>>;
}

struct TxRunner<'a, 'c> {
    tx: &'a mut Transaction<'c, MySql>,
}

impl StatementRunner for TxRunner<'_, '_> {
    fn run<'a>(
        &'a mut self,
        sql: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<u64, sqlx::Error>> + Send + 'a>> {
        Box::pin(async move {
            (&mut **self.tx)
                .execute(sql)
                .await
                .map(|done| done.rows_affected())
        })
    }
}

pub struct IngestService {
    oracle: LlmClient,
}

impl IngestService {
    pub fn new(oracle: LlmClient) -> Self {
        Self { oracle }
    }

    /// Analyze and replay one SQL script against the target database.
    ///
    /// `params.database` names the target, created if absent. The report is
    /// returned even when individual statements failed; callers must inspect
    /// the execution log for partial failure.
    pub async fn ingest(
        &self,
        params: &ConnectionParams,
        script: &str,
    ) -> AppResult<IngestReport> {
        let analysis = self.analyze(script).await?;
        if analysis.is_empty() {
            return Err(AppError::invalid_input(
                "No SQL statements found in the uploaded file.",
            ));
        }
        self.apply(params, &analysis).await
    }

    /// Extract structured statements from the script via the oracle.
    async fn analyze(&self, script: &str) -> AppResult<IngestionAnalysis> {
        let raw = self
            .oracle
            .complete(prompt::SQL_EXTRACTION_PROMPT, script, EXTRACTION_TEMPERATURE)
            .await?;
        parse_analysis(&raw)
    }

    /// Replay the analysis: database, then tables in order, then inserts in
    /// order, all on one connection committed once at the end.
    async fn apply(
        &self,
        params: &ConnectionParams,
        analysis: &IngestionAnalysis,
    ) -> AppResult<IngestReport> {
        let database = params.database.as_deref().ok_or_else(|| {
            AppError::invalid_input("A target database is required for SQL file ingestion.")
        })?;

        DbClient::ensure_database(params, database).await?;

        // Single connection for the whole batch; a connect failure aborts
        // atomically before any statement runs.
        let mut conn = connect(params).await?;
        let mut tx = conn.begin().await.map_err(AppError::from)?;

        let (tables_created, total_inserts, log) =
            replay(&mut TxRunner { tx: &mut tx }, analysis).await;

        tx.commit().await.map_err(AppError::from)?;
        let _ = conn.close().await;

        info!(
            database = %database,
            tables = tables_created.len(),
            inserts = total_inserts,
            "SQL file ingested"
        );
        Ok(IngestReport {
            tables_created,
            total_inserts_executed: total_inserts,
            execution_log: log,
        })
    }
}

/// Run every extracted statement in order, capturing each outcome into the
/// execution log. A statement failure is recorded and the loop moves on;
/// nothing here aborts the batch.
pub(crate) async fn replay<R: StatementRunner>(
    runner: &mut R,
    analysis: &IngestionAnalysis,
) -> (Vec<String>, u64, Vec<LogEntry>) {
    let mut log = Vec::new();
    let mut tables_created = Vec::new();
    let mut total_inserts = 0u64;

    for table in &analysis.tables {
        match runner.run(&table.create_statement).await {
            Ok(_) => {
                tables_created.push(table.table_name.clone());
                log.push(LogEntry::success(format!(
                    "Table '{}' created successfully",
                    table.table_name
                )));
            }
            Err(e) if is_table_exists_error(&e) => {
                log.push(LogEntry::info(format!(
                    "Table '{}' already exists, skipped",
                    table.table_name
                )));
            }
            Err(e) => {
                warn!(table = %table.table_name, error = %e, "CREATE TABLE failed");
                log.push(LogEntry::error(
                    format!("Failed to create table '{}'", table.table_name),
                    Some(e.to_string()),
                ));
            }
        }
    }

    for statement in &analysis.inserts {
        let rewritten = rewrite_insert_ignore(statement);
        match runner.run(&rewritten).await {
            Ok(affected) => {
                if affected > 0 {
                    total_inserts += affected;
                }
                log.push(LogEntry::insert(
                    format!("{} row(s) inserted", affected),
                    Some(preview(&rewritten)),
                ));
            }
            Err(e) => {
                warn!(error = %e, "INSERT failed");
                log.push(LogEntry::error(
                    "Insert statement failed".to_string(),
                    Some(format!("{}; statement: {}", e, preview(statement))),
                ));
            }
        }
    }

    (tables_created, total_inserts, log)
}

/// Parse the oracle's extraction output into a validated analysis.
///
/// The model is an untrusted extractor: the top level must be an object
/// carrying both `tables` and `inserts` as arrays, and every table entry
/// must have a non-empty name and create statement. Any violation is a
/// first-class error and nothing executes.
pub fn parse_analysis(raw: &str) -> AppResult<IngestionAnalysis> {
    let text = strip_code_fences(raw);
    let value: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| AppError::oracle_format(format!("output is not valid JSON: {}", e)))?;

    let object = value
        .as_object()
        .ok_or_else(|| AppError::oracle_format("output is not a JSON object"))?;
    for key in ["tables", "inserts"] {
        match object.get(key) {
            None => {
                return Err(AppError::oracle_format(format!("missing '{}' field", key)));
            }
            Some(v) if !v.is_array() => {
                return Err(AppError::oracle_format(format!(
                    "'{}' field is not an array",
                    key
                )));
            }
            Some(_) => {}
        }
    }

    let analysis: IngestionAnalysis = serde_json::from_value(value)
        .map_err(|e| AppError::oracle_format(format!("unexpected statement shape: {}", e)))?;

    for (index, table) in analysis.tables.iter().enumerate() {
        if table.table_name.trim().is_empty() {
            return Err(AppError::oracle_format(format!(
                "table entry {} has an empty table_name",
                index
            )));
        }
        if table.create_statement.trim().is_empty() {
            return Err(AppError::oracle_format(format!(
                "table entry {} has an empty create_statement",
                index
            )));
        }
    }

    Ok(analysis)
}

/// Rewrite a leading `INSERT INTO` token sequence to `INSERT IGNORE INTO`,
/// so rows violating a uniqueness constraint are skipped instead of raising
/// a duplicate-key error. Matching is case-insensitive and anchored at the
/// start of the statement (leading whitespace aside); anything else, such as
/// a leading comment or a different statement type, passes through unchanged.
pub fn rewrite_insert_ignore(statement: &str) -> String {
    let body = statement.trim_start();
    let leading = &statement[..statement.len() - body.len()];

    let Some(after_insert) = strip_keyword(body, "INSERT") else {
        return statement.to_string();
    };
    let between = after_insert.trim_start();
    if between.len() == after_insert.len() {
        // no whitespace after INSERT; not the token sequence
        return statement.to_string();
    }
    let Some(after_into) = strip_keyword(between, "INTO") else {
        return statement.to_string();
    };
    if after_into
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        // INTO runs into the next word (e.g. INTOX); not a token boundary
        return statement.to_string();
    }

    format!("{}INSERT IGNORE INTO{}", leading, after_into)
}

fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    match text.get(..keyword.len()) {
        Some(head) if head.eq_ignore_ascii_case(keyword) => Some(&text[keyword.len()..]),
        _ => None,
    }
}

/// True when the driver error means the table already exists, which the
/// pipeline downgrades to an informational log entry.
fn is_table_exists_error(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db_err) => {
            already_exists(db_err.code().as_deref(), db_err.message())
        }
        _ => false,
    }
}

/// Classification behind [`is_table_exists_error`], split out for testing.
/// MySQL reports SQLSTATE 42S01 (error 1050) for `CREATE TABLE` on an
/// existing table.
pub fn already_exists(sql_state: Option<&str>, message: &str) -> bool {
    if sql_state == Some("42S01") {
        return true;
    }
    message.to_ascii_lowercase().contains("already exists")
}

fn preview(statement: &str) -> String {
    if statement.chars().count() <= PREVIEW_CHARS {
        statement.to_string()
    } else {
        let truncated: String = statement.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LogKind, TableSpec};

    // Replay loop: statements run in order, failures are isolated.

    /// Runner that records every statement and fails any containing "BROKEN".
    #[derive(Default)]
    struct ScriptedRunner {
        executed: Vec<String>,
    }

    impl StatementRunner for ScriptedRunner {
        fn run<'a>(
            &'a mut self,
            sql: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<u64, sqlx::Error>> + Send + 'a>> {
            self.executed.push(sql.to_string());
            let result = if sql.contains("BROKEN") {
                Err(sqlx::Error::Protocol(
                    "You have an error in your SQL syntax".into(),
                ))
            } else {
                Ok(1)
            };
            Box::pin(async move { result })
        }
    }

    fn table(name: &str, create: &str) -> TableSpec {
        TableSpec {
            table_name: name.to_string(),
            columns: vec!["id".to_string()],
            create_statement: create.to_string(),
        }
    }

    #[tokio::test]
    async fn test_replay_isolates_create_failures() {
        let analysis = IngestionAnalysis {
            tables: vec![
                table("users", "CREATE TABLE users (id INT)"),
                table("bad", "CREATE TABLE BROKEN ((("),
                table("orders", "CREATE TABLE orders (id INT)"),
            ],
            inserts: Vec::new(),
        };
        let mut runner = ScriptedRunner::default();

        let (created, inserts, log) = replay(&mut runner, &analysis).await;

        assert_eq!(created, vec!["users", "orders"]);
        assert_eq!(inserts, 0);
        assert_eq!(runner.executed.len(), 3, "every create must be attempted");

        let kinds: Vec<LogKind> = log.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![LogKind::Success, LogKind::Error, LogKind::Success]);
        assert!(log[1].message.contains("'bad'"));
    }

    #[tokio::test]
    async fn test_replay_continues_after_insert_failure() {
        let analysis = IngestionAnalysis {
            tables: Vec::new(),
            inserts: vec![
                "INSERT INTO a VALUES (1)".to_string(),
                "INSERT INTO BROKEN VALUES".to_string(),
                "INSERT INTO b VALUES (2)".to_string(),
            ],
        };
        let mut runner = ScriptedRunner::default();

        let (created, inserts, log) = replay(&mut runner, &analysis).await;

        assert!(created.is_empty());
        assert_eq!(inserts, 2, "failed insert must not count rows");
        assert_eq!(runner.executed.len(), 3, "inserts after a failure still run");

        let errors = log.iter().filter(|e| e.kind == LogKind::Error).count();
        assert_eq!(errors, 1);
        // the failing entry carries the original statement, not the rewrite
        assert!(log[1].details.as_deref().unwrap().contains("INSERT INTO BROKEN"));
    }

    #[tokio::test]
    async fn test_replay_rewrites_inserts_before_execution() {
        let analysis = IngestionAnalysis {
            tables: Vec::new(),
            inserts: vec!["insert into t (id) values (1)".to_string()],
        };
        let mut runner = ScriptedRunner::default();

        let _ = replay(&mut runner, &analysis).await;

        assert_eq!(runner.executed, vec!["INSERT IGNORE INTO t (id) values (1)"]);
    }

    // Rewrite behavior

    #[test]
    fn test_rewrite_uppercase() {
        assert_eq!(
            rewrite_insert_ignore("INSERT INTO users VALUES (1)"),
            "INSERT IGNORE INTO users VALUES (1)"
        );
    }

    #[test]
    fn test_rewrite_lowercase() {
        assert_eq!(
            rewrite_insert_ignore("insert into users values (1)"),
            "INSERT IGNORE INTO users values (1)"
        );
    }

    #[test]
    fn test_rewrite_mixed_case() {
        assert_eq!(
            rewrite_insert_ignore("Insert Into users VALUES (1)"),
            "INSERT IGNORE INTO users VALUES (1)"
        );
    }

    #[test]
    fn test_rewrite_preserves_leading_whitespace() {
        assert_eq!(
            rewrite_insert_ignore("  INSERT INTO t VALUES (1)"),
            "  INSERT IGNORE INTO t VALUES (1)"
        );
    }

    #[test]
    fn test_rewrite_collapses_token_gap_only() {
        assert_eq!(
            rewrite_insert_ignore("INSERT   INTO t VALUES (1)"),
            "INSERT IGNORE INTO t VALUES (1)"
        );
    }

    #[test]
    fn test_no_rewrite_after_comment() {
        let stmt = "-- seed data\nINSERT INTO t VALUES (1)";
        assert_eq!(rewrite_insert_ignore(stmt), stmt);
    }

    #[test]
    fn test_no_rewrite_for_other_statements() {
        let stmt = "UPDATE t SET a = 1";
        assert_eq!(rewrite_insert_ignore(stmt), stmt);
        let stmt = "CREATE TABLE t (id INT)";
        assert_eq!(rewrite_insert_ignore(stmt), stmt);
    }

    #[test]
    fn test_no_rewrite_when_tokens_run_together() {
        let stmt = "INSERTINTO t VALUES (1)";
        assert_eq!(rewrite_insert_ignore(stmt), stmt);
        let stmt = "INSERT INTOX VALUES (1)";
        assert_eq!(rewrite_insert_ignore(stmt), stmt);
    }

    #[test]
    fn test_rewrite_with_backtick_table() {
        assert_eq!(
            rewrite_insert_ignore("INSERT INTO `users` (id) VALUES (1)"),
            "INSERT IGNORE INTO `users` (id) VALUES (1)"
        );
    }

    // Analysis parsing

    #[test]
    fn test_parse_valid_analysis() {
        let raw = r#"{
            "tables": [{"table_name": "users", "columns": ["id", "name"],
                        "create_statement": "CREATE TABLE users (id INT, name TEXT)"}],
            "inserts": ["INSERT INTO users VALUES (1, 'Ada')"]
        }"#;
        let analysis = parse_analysis(raw).unwrap();
        assert_eq!(analysis.tables.len(), 1);
        assert_eq!(analysis.tables[0].table_name, "users");
        assert_eq!(analysis.inserts.len(), 1);
    }

    #[test]
    fn test_parse_fenced_analysis() {
        let raw = "```json\n{\"tables\": [], \"inserts\": [\"INSERT INTO t VALUES (1)\"]}\n```";
        let analysis = parse_analysis(raw).unwrap();
        assert_eq!(analysis.inserts.len(), 1);
    }

    #[test]
    fn test_parse_rejects_non_json() {
        let err = parse_analysis("I could not find any SQL here.").unwrap_err();
        assert!(matches!(err, AppError::OracleFormat { .. }));
    }

    #[test]
    fn test_parse_rejects_non_object() {
        let err = parse_analysis("[1, 2, 3]").unwrap_err();
        assert!(err.to_string().contains("not a JSON object"));
    }

    #[test]
    fn test_parse_rejects_missing_keys() {
        let err = parse_analysis(r#"{"tables": []}"#).unwrap_err();
        assert!(err.to_string().contains("'inserts'"));

        let err = parse_analysis(r#"{"inserts": []}"#).unwrap_err();
        assert!(err.to_string().contains("'tables'"));
    }

    #[test]
    fn test_parse_rejects_non_array_fields() {
        let err = parse_analysis(r#"{"tables": {}, "inserts": []}"#).unwrap_err();
        assert!(err.to_string().contains("not an array"));
    }

    #[test]
    fn test_parse_rejects_incomplete_table_entry() {
        let raw = r#"{"tables": [{"table_name": "t", "columns": []}], "inserts": []}"#;
        let err = parse_analysis(raw).unwrap_err();
        assert!(matches!(err, AppError::OracleFormat { .. }));
    }

    #[test]
    fn test_parse_rejects_blank_table_fields() {
        let raw = r#"{"tables": [{"table_name": " ", "columns": ["id"],
                       "create_statement": "CREATE TABLE x (id INT)"}], "inserts": []}"#;
        let err = parse_analysis(raw).unwrap_err();
        assert!(err.to_string().contains("empty table_name"));

        let raw = r#"{"tables": [{"table_name": "x", "columns": ["id"],
                       "create_statement": ""}], "inserts": []}"#;
        let err = parse_analysis(raw).unwrap_err();
        assert!(err.to_string().contains("empty create_statement"));
    }

    // Already-exists classification

    #[test]
    fn test_already_exists_by_sqlstate() {
        assert!(already_exists(Some("42S01"), "Table 'users' exists"));
    }

    #[test]
    fn test_already_exists_by_message() {
        assert!(already_exists(None, "Table 'users' already exists"));
        assert!(already_exists(Some("HY000"), "Already Exists"));
    }

    #[test]
    fn test_other_errors_are_not_already_exists() {
        assert!(!already_exists(Some("42000"), "You have an error in your SQL syntax"));
        assert!(!already_exists(None, "Unknown column 'x'"));
    }

    // Preview

    #[test]
    fn test_preview_truncates_long_statements() {
        let long = "x".repeat(500);
        let p = preview(&long);
        assert!(p.ends_with("..."));
        assert_eq!(p.chars().count(), PREVIEW_CHARS + 3);
    }

    #[test]
    fn test_preview_keeps_short_statements() {
        assert_eq!(preview("INSERT INTO t VALUES (1)"), "INSERT INTO t VALUES (1)");
    }
}
