//! CSV export round-trip tests: parsing the returned CSV text must
//! reproduce the same headers and row values as the record list.

use nl2sql_server::service::export::to_csv;
use serde_json::{Value as JsonValue, json};

fn record(pairs: &[(&str, JsonValue)]) -> serde_json::Map<String, JsonValue> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn parse(csv_text: &str) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_reader(csv_text.as_bytes());
    let headers = reader.headers().unwrap().iter().map(String::from).collect();
    let rows = reader
        .records()
        .map(|r| r.unwrap().iter().map(String::from).collect())
        .collect();
    (headers, rows)
}

#[test]
fn round_trip_plain_values() {
    let columns = vec!["id".to_string(), "name".to_string(), "score".to_string()];
    let rows = vec![
        record(&[("id", json!(1)), ("name", json!("Ada")), ("score", json!(9.5))]),
        record(&[("id", json!(2)), ("name", json!("Grace")), ("score", json!(8.0))]),
    ];

    let (headers, parsed) = parse(&to_csv(&columns, &rows).unwrap());
    assert_eq!(headers, columns);
    assert_eq!(parsed[0], vec!["1", "Ada", "9.5"]);
    assert_eq!(parsed[1][1], "Grace");
}

#[test]
fn round_trip_embedded_commas_and_quotes() {
    let columns = vec!["id".to_string(), "address".to_string()];
    let rows = vec![record(&[
        ("id", json!(1)),
        ("address", json!("12 \"The Lane\", Suite 3, Anytown")),
    ])];

    let (headers, parsed) = parse(&to_csv(&columns, &rows).unwrap());
    assert_eq!(headers, columns);
    assert_eq!(parsed[0][1], "12 \"The Lane\", Suite 3, Anytown");
}

#[test]
fn round_trip_embedded_newline() {
    let columns = vec!["note".to_string()];
    let rows = vec![record(&[("note", json!("first line\nsecond line"))])];

    let (_, parsed) = parse(&to_csv(&columns, &rows).unwrap());
    assert_eq!(parsed[0][0], "first line\nsecond line");
}

#[test]
fn empty_result_set_is_header_only() {
    let columns = vec!["a".to_string(), "b".to_string()];
    let csv_text = to_csv(&columns, &[]).unwrap();
    let (headers, parsed) = parse(&csv_text);
    assert_eq!(headers, columns);
    assert!(parsed.is_empty());
}

#[test]
fn null_values_become_empty_cells() {
    let columns = vec!["id".to_string(), "nickname".to_string()];
    let rows = vec![record(&[("id", json!(3)), ("nickname", JsonValue::Null)])];

    let (_, parsed) = parse(&to_csv(&columns, &rows).unwrap());
    assert_eq!(parsed[0], vec!["3", ""]);
}
