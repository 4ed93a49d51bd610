use crate::backend::{Backend, QueryResult};
use crate::verbose::Timer;

/// What a read-only query produced: rows, or the database's complaint.
#[derive(Debug)]
pub enum ExecutionOutcome {
    Rows(QueryResult),
    Error(String),
}

/// Bound a statement's result size.
///
/// Trailing terminators are dropped. A statement that does not mention
/// `limit` anywhere (case-insensitive, substring match) is wrapped as
/// `SELECT * FROM (<sql>) LIMIT <limit>`; anything else is left alone.
pub fn apply_row_limit(sql: &str, limit: usize) -> String {
    let sql = sql.trim().trim_end_matches(|c: char| c == ';' || c.is_whitespace());
    if sql.to_lowercase().contains("limit") {
        sql.to_string()
    } else {
        format!("SELECT * FROM ({}) LIMIT {}", sql, limit)
    }
}

/// Run an already-validated SELECT and materialize the result.
///
/// Never fails: any database error comes back as [`ExecutionOutcome::Error`].
pub async fn run_readonly_query<B: Backend>(
    backend: &B,
    sql: &str,
    limit: usize,
) -> ExecutionOutcome {
    let bounded = apply_row_limit(sql, limit);
    tracing::debug!(sql = %bounded, "executing bounded query");

    let timer = Timer::start();
    match backend.execute(&bounded).await {
        Ok(result) => {
            tracing::debug!(
                rows = result.rows.len(),
                elapsed_ms = timer.elapsed_ms() as u64,
                "query complete"
            );
            ExecutionOutcome::Rows(result)
        }
        Err(e) => {
            tracing::warn!(error = %e, elapsed_ms = timer.elapsed_ms() as u64, "query failed");
            let message = match e {
                crate::error::AskError::Query { message }
                | crate::error::AskError::Connection { message } => message,
                other => other.to_string(),
            };
            ExecutionOutcome::Error(message)
        }
    }
}
