use askdb::backend::sqlite::{seed_sample_database, SqliteBackend, SAMPLE_SCHEMA};
use askdb::backend::{Backend, CellValue, ColumnMeta, QueryResult};
use askdb::error::AskError;
use askdb::handler::{generate_and_run, QueryRequest, QueryResponse, DEFAULT_MAX_RESULTS};
use askdb::llm::{Generation, SqlGenerator};
use std::sync::Mutex;

/// Generator that always replies the same way and remembers what it was asked.
struct FixedGenerator {
    reply: Generation,
    seen: Mutex<Vec<(String, String)>>,
}

impl FixedGenerator {
    fn sql(sql: &str) -> Self {
        Self::new(Generation::Sql(sql.to_string()))
    }

    fn new(reply: Generation) -> Self {
        Self {
            reply,
            seen: Mutex::new(Vec::new()),
        }
    }
}

impl SqlGenerator for FixedGenerator {
    async fn generate(&self, question: &str, schema: &str) -> Result<Generation, AskError> {
        self.seen
            .lock()
            .unwrap()
            .push((question.to_string(), schema.to_string()));
        Ok(self.reply.clone())
    }
}

struct FailingGenerator;

impl SqlGenerator for FailingGenerator {
    async fn generate(&self, _question: &str, _schema: &str) -> Result<Generation, AskError> {
        Err(AskError::Llm {
            message: "upstream unavailable".to_string(),
        })
    }
}

/// Backend that records statements and returns one fixed row.
struct RecordingBackend {
    executed: Mutex<Vec<String>>,
}

impl RecordingBackend {
    fn new() -> Self {
        Self {
            executed: Mutex::new(Vec::new()),
        }
    }

    fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

impl Backend for RecordingBackend {
    async fn execute(&self, sql: &str) -> Result<QueryResult, AskError> {
        self.executed.lock().unwrap().push(sql.to_string());
        Ok(QueryResult {
            columns: vec![ColumnMeta {
                name: "n".to_string(),
                type_name: "INTEGER".to_string(),
            }],
            rows: vec![vec![CellValue::Integer(1)]],
        })
    }
}

async fn seeded_backend() -> (tempfile::TempDir, SqliteBackend) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.db");
    seed_sample_database(&path).await.unwrap();
    let backend = SqliteBackend::connect(&format!("sqlite://{}", path.display()), 2, false).unwrap();
    (dir, backend)
}

fn assert_error_envelope_invariant(response: &QueryResponse) {
    if response.error().is_some() {
        assert!(response.rows().is_none());
        assert!(response.columns().is_none());
    } else {
        assert!(response.rows().is_some());
        assert!(response.columns().is_some());
    }
}

#[test]
fn test_request_without_max_results_leaves_it_unset() {
    let request: QueryRequest =
        serde_json::from_str(r#"{"question": "q", "schema": "s"}"#).unwrap();
    assert_eq!(request.max_results, None);
}

#[tokio::test]
async fn test_unset_max_results_uses_default() {
    let backend = RecordingBackend::new();
    let generator = FixedGenerator::sql("SELECT * FROM orders");
    let request = QueryRequest::new("all orders", SAMPLE_SCHEMA);

    generate_and_run(&generator, &backend, &request).await.unwrap();

    assert_eq!(DEFAULT_MAX_RESULTS, 200);
    assert_eq!(
        backend.executed(),
        vec!["SELECT * FROM (SELECT * FROM orders) LIMIT 200".to_string()]
    );
}

#[tokio::test]
async fn test_list_all_customers() {
    let (_dir, backend) = seeded_backend().await;
    let generator = FixedGenerator::sql("SELECT * FROM customers");
    let request = QueryRequest::new("list all customers", SAMPLE_SCHEMA);

    let response = generate_and_run(&generator, &backend, &request).await.unwrap();

    assert_eq!(response.sql(), "SELECT * FROM customers");
    assert_eq!(
        response.columns().unwrap(),
        &["id".to_string(), "name".to_string(), "email".to_string(), "city".to_string()]
    );
    let rows = response.rows().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1]["name"], "Bob Malik");
    assert_eq!(rows[2]["city"], "Islamabad");
    assert!(response.error().is_none());
    assert_error_envelope_invariant(&response);
}

#[tokio::test]
async fn test_question_and_schema_reach_generator() {
    let backend = RecordingBackend::new();
    let generator = FixedGenerator::sql("SELECT 1");
    let request = QueryRequest::new("how many?", "t(a)");

    generate_and_run(&generator, &backend, &request).await.unwrap();

    let seen = generator.seen.lock().unwrap().clone();
    assert_eq!(seen, vec![("how many?".to_string(), "t(a)".to_string())]);
}

#[tokio::test]
async fn test_unsafe_sql_is_rejected_without_execution() {
    let backend = RecordingBackend::new();
    let generator = FixedGenerator::sql("DROP TABLE customers");
    let request = QueryRequest::new("remove customers", SAMPLE_SCHEMA);

    let result = generate_and_run(&generator, &backend, &request).await;

    assert!(matches!(result, Err(AskError::UnsafeQuery { .. })));
    assert!(backend.executed().is_empty());
}

#[tokio::test]
async fn test_unanswerable_is_rejected_without_execution() {
    let backend = RecordingBackend::new();
    let generator = FixedGenerator::new(Generation::Unanswerable);
    let request = QueryRequest::new("what is the weather?", SAMPLE_SCHEMA);

    let result = generate_and_run(&generator, &backend, &request).await;

    assert!(matches!(result, Err(AskError::Unanswerable)));
    assert!(backend.executed().is_empty());
}

#[tokio::test]
async fn test_generator_failure_propagates() {
    let backend = RecordingBackend::new();
    let request = QueryRequest::new("anything", SAMPLE_SCHEMA);

    let result = generate_and_run(&FailingGenerator, &backend, &request).await;

    assert!(matches!(result, Err(AskError::Llm { .. })));
    assert!(backend.executed().is_empty());
}

#[tokio::test]
async fn test_unknown_column_lands_in_error_field() {
    let (_dir, backend) = seeded_backend().await;
    let generator = FixedGenerator::sql("SELECT phone FROM customers");
    let request = QueryRequest::new("customer phone numbers", SAMPLE_SCHEMA);

    let response = generate_and_run(&generator, &backend, &request).await.unwrap();

    assert_eq!(response.sql(), "SELECT phone FROM customers");
    let error = response.error().expect("error should be set");
    assert!(error.contains("no such column"), "Got: {}", error);
    assert_error_envelope_invariant(&response);
}

#[tokio::test]
async fn test_max_results_is_applied() {
    let backend = RecordingBackend::new();
    let generator = FixedGenerator::sql("SELECT * FROM orders;");
    let mut request = QueryRequest::new("all orders", SAMPLE_SCHEMA);
    request.max_results = Some(7);

    generate_and_run(&generator, &backend, &request).await.unwrap();

    assert_eq!(
        backend.executed(),
        vec!["SELECT * FROM (SELECT * FROM orders) LIMIT 7".to_string()]
    );
}

#[tokio::test]
async fn test_max_results_bounds_real_rows() {
    let (_dir, backend) = seeded_backend().await;
    let generator = FixedGenerator::sql("SELECT * FROM orders");
    let mut request = QueryRequest::new("all orders", SAMPLE_SCHEMA);
    request.max_results = Some(3);

    let response = generate_and_run(&generator, &backend, &request).await.unwrap();
    assert_eq!(response.rows().unwrap().len(), 3);
}

#[test]
fn test_response_serializes_absent_fields_as_null() {
    let response = QueryResponse::with_error("SELECT x".to_string(), "boom".to_string());
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"sql": "SELECT x", "columns": null, "rows": null, "error": "boom"})
    );
}
