//! Ingestion pipeline tests that run without a live database: extraction
//! output validation, the INSERT rewrite, and report/log wire shapes.

use nl2sql_server::AppError;
use nl2sql_server::models::{IngestionAnalysis, LogEntry, LogKind};
use nl2sql_server::service::ingest::{already_exists, parse_analysis, rewrite_insert_ignore};

#[test]
fn rewrite_applies_to_all_casings() {
    for stmt in [
        "insert into x (id) values (1)",
        "INSERT INTO x (id) values (1)",
        "Insert Into x (id) values (1)",
    ] {
        let rewritten = rewrite_insert_ignore(stmt);
        assert!(
            rewritten.starts_with("INSERT IGNORE INTO x"),
            "{} -> {}",
            stmt,
            rewritten
        );
    }
}

#[test]
fn rewrite_leaves_other_statements_alone() {
    for stmt in [
        "-- comment first\nINSERT INTO x VALUES (1)",
        "REPLACE INTO x VALUES (1)",
        "UPDATE x SET a = 1",
        "INSERTINTO x VALUES (1)",
    ] {
        assert_eq!(rewrite_insert_ignore(stmt), stmt);
    }
}

#[test]
fn rewrite_is_idempotent() {
    // Replaying the same file twice must not stack IGNORE tokens: a
    // statement already carrying IGNORE no longer matches INSERT INTO.
    let once = rewrite_insert_ignore("INSERT INTO x VALUES (1)");
    assert_eq!(rewrite_insert_ignore(&once), once);
}

#[test]
fn analysis_parses_well_formed_output() {
    let raw = r#"{
        "tables": [
            {"table_name": "users", "columns": ["id", "email"],
             "create_statement": "CREATE TABLE users (id INT PRIMARY KEY, email VARCHAR(255) UNIQUE)"},
            {"table_name": "orders", "columns": ["id", "user_id"],
             "create_statement": "CREATE TABLE orders (id INT PRIMARY KEY, user_id INT)"}
        ],
        "inserts": [
            "INSERT INTO users (id, email) VALUES (1, 'a@example.com')",
            "INSERT INTO orders (id, user_id) VALUES (1, 1)"
        ]
    }"#;

    let analysis = parse_analysis(raw).unwrap();
    assert_eq!(analysis.tables.len(), 2);
    assert_eq!(analysis.tables[1].table_name, "orders");
    assert_eq!(analysis.inserts.len(), 2);
    assert!(!analysis.is_empty());
}

#[test]
fn analysis_accepts_markdown_fenced_output() {
    let raw = "```json\n{\"tables\": [], \"inserts\": [\"INSERT INTO t VALUES (1)\"]}\n```";
    assert_eq!(parse_analysis(raw).unwrap().inserts.len(), 1);
}

#[test]
fn analysis_rejects_malformed_output_before_execution() {
    let cases = [
        "sorry, I can't parse that script",
        "[]",
        r#"{"tables": []}"#,
        r#"{"inserts": []}"#,
        r#"{"tables": "none", "inserts": []}"#,
        r#"{"tables": [{"table_name": "t"}], "inserts": []}"#,
    ];
    for raw in cases {
        let err = parse_analysis(raw).unwrap_err();
        assert!(
            matches!(err, AppError::OracleFormat { .. }),
            "expected format error for {:?}, got {}",
            raw,
            err
        );
    }
}

#[test]
fn empty_analysis_is_detectable_for_preflight() {
    let analysis: IngestionAnalysis =
        serde_json::from_str(r#"{"tables": [], "inserts": []}"#).unwrap();
    assert!(analysis.is_empty());
}

#[test]
fn already_exists_classification() {
    assert!(already_exists(Some("42S01"), "whatever"));
    assert!(already_exists(None, "Table 'users' already exists"));
    assert!(!already_exists(Some("42000"), "syntax error"));
}

#[test]
fn execution_log_serializes_wire_shape() {
    let log = vec![
        LogEntry::success("Table 'users' created successfully"),
        LogEntry::info("Table 'orders' already exists, skipped"),
        LogEntry::error("Failed to create table 'bad'", Some("syntax error".into())),
        LogEntry::insert("2 row(s) inserted", Some("INSERT IGNORE INTO users ...".into())),
    ];
    let value = serde_json::to_value(&log).unwrap();
    let entries = value.as_array().unwrap();

    assert_eq!(entries[0]["type"], "success");
    assert_eq!(entries[1]["type"], "info");
    assert_eq!(entries[2]["type"], "error");
    assert_eq!(entries[2]["details"], "syntax error");
    assert_eq!(entries[3]["type"], "insert");
    // details omitted entirely when absent
    assert!(entries[0].get("details").is_none());

    // entries deserialize back to the same kinds
    let parsed: Vec<LogEntry> = serde_json::from_value(value).unwrap();
    assert_eq!(parsed[1].kind, LogKind::Info);
    assert_eq!(parsed[3].kind, LogKind::Insert);
}
