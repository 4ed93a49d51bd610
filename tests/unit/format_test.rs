use askdb::backend::{CellValue, ColumnMeta, QueryResult};
use askdb::format::{to_toon, to_toon_kv};

fn customers() -> QueryResult {
    QueryResult {
        columns: vec![
            ColumnMeta { name: "name".to_string(), type_name: "TEXT".to_string() },
            ColumnMeta { name: "city".to_string(), type_name: "TEXT".to_string() },
        ],
        rows: vec![
            vec![
                CellValue::Text("Alice Johnson".to_string()),
                CellValue::Text("Lahore".to_string()),
            ],
            vec![
                CellValue::Text("Bob Malik".to_string()),
                CellValue::Text("Karachi".to_string()),
            ],
        ],
    }
}

/// Helper: encode to TOON and decode back to serde_json::Value (no type coercion)
fn round_trip(result: &QueryResult) -> serde_json::Value {
    let toon = to_toon(&result.column_names(), &result.row_maps()).unwrap();
    toon_format::decode_no_coerce(&toon).unwrap()
}

#[test]
fn test_rows_round_trip() {
    let decoded = round_trip(&customers());
    let rows = decoded.as_array().expect("output should be a root array");

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["name"], "Alice Johnson");
    assert_eq!(rows[0]["city"], "Lahore");
    assert_eq!(rows[1]["name"], "Bob Malik");
    assert_eq!(rows[1]["city"], "Karachi");
}

#[test]
fn test_header_lists_columns_in_order() {
    let result = customers();
    let toon = to_toon(&result.column_names(), &result.row_maps()).unwrap();
    let header = toon.lines().next().unwrap();
    assert!(header.contains("{name,city}"), "Got: {}", header);
}

#[test]
fn test_zero_row_result_keeps_header() {
    let columns = vec!["id".to_string(), "amount".to_string()];
    let toon = to_toon(&columns, &[]).unwrap();
    assert_eq!(toon, "[0]{id,amount}:\n");
}

#[test]
fn test_null_cells_encode() {
    let result = QueryResult {
        columns: vec![
            ColumnMeta { name: "email".to_string(), type_name: "TEXT".to_string() },
        ],
        rows: vec![vec![CellValue::Null]],
    };
    let toon = to_toon(&result.column_names(), &result.row_maps()).unwrap();
    assert!(toon.contains("null"), "Got: {}", toon);
}

#[test]
fn test_kv_lines() {
    let toon = to_toon_kv(&[("sql", "SELECT 1"), ("rows", "3")]);
    assert_eq!(toon, "sql: SELECT 1\nrows: 3");
}

#[test]
fn test_kv_empty() {
    assert_eq!(to_toon_kv(&[]), "");
}
