use crate::backend::{Backend, QueryResult};
use crate::error::AskError;
use crate::executor::{self, ExecutionOutcome};
use crate::llm::{Generation, SqlGenerator};
use crate::validation::{self, ValidationResult};
use crate::verbose::Timer;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_RESULTS: usize = 200;

/// A question about a database, described by `schema`.
///
/// `max_results: None` runs with [`DEFAULT_MAX_RESULTS`]; the server fills in
/// its configured default before that happens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    pub schema: String,
    #[serde(default)]
    pub max_results: Option<usize>,
}

impl QueryRequest {
    pub fn new(question: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            schema: schema.into(),
            max_results: None,
        }
    }
}

/// The generated SQL plus either its rows or the error it raised.
///
/// Only constructible through [`QueryResponse::with_rows`] and
/// [`QueryResponse::with_error`], so `error` and `rows` never coexist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResponse {
    sql: String,
    columns: Option<Vec<String>>,
    rows: Option<Vec<serde_json::Map<String, serde_json::Value>>>,
    error: Option<String>,
}

impl QueryResponse {
    pub fn with_rows(sql: String, result: &QueryResult) -> Self {
        Self {
            sql,
            columns: Some(result.column_names()),
            rows: Some(result.row_maps()),
            error: None,
        }
    }

    pub fn with_error(sql: String, error: String) -> Self {
        Self {
            sql,
            columns: None,
            rows: None,
            error: Some(error),
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn columns(&self) -> Option<&[String]> {
        self.columns.as_deref()
    }

    pub fn rows(&self) -> Option<&[serde_json::Map<String, serde_json::Value>]> {
        self.rows.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Turn a question into SQL, vet it, run it, and package the outcome.
///
/// Rejections (`Unanswerable`, `UnsafeQuery`) and model failures come back as
/// `Err`. Database errors do not: they are reported in the response's
/// `error` field.
pub async fn generate_and_run<G, B>(
    generator: &G,
    backend: &B,
    request: &QueryRequest,
) -> Result<QueryResponse, AskError>
where
    G: SqlGenerator,
    B: Backend,
{
    tracing::debug!(question = %request.question, "generating sql");
    let timer = Timer::start();
    let sql = match generator.generate(&request.question, &request.schema).await? {
        Generation::Sql(sql) => sql,
        Generation::Unanswerable => {
            tracing::info!("rejected: question not answerable with schema");
            return Err(AskError::Unanswerable);
        }
    };
    tracing::debug!(sql = %sql, elapsed_ms = timer.elapsed_ms() as u64, "sql generated");

    if let ValidationResult::Denied { reason } = validation::validate(&sql) {
        tracing::info!(sql = %sql, kind = ?reason.kind, "rejected: {}", reason.detail);
        return Err(AskError::UnsafeQuery {
            reason: reason.detail,
        });
    }

    let limit = request.max_results.unwrap_or(DEFAULT_MAX_RESULTS);
    let response = match executor::run_readonly_query(backend, &sql, limit).await {
        ExecutionOutcome::Rows(result) => {
            tracing::info!(rows = result.rows.len(), "completed");
            QueryResponse::with_rows(sql, &result)
        }
        ExecutionOutcome::Error(message) => {
            tracing::info!(error = %message, "completed with error");
            QueryResponse::with_error(sql, message)
        }
    };
    Ok(response)
}
