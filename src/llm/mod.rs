pub mod gemini;
pub mod prompt;

use crate::error::AskError;

/// Reply the model is told to give when the schema cannot answer the question.
pub const CANNOT_ANSWER: &str = "CANNOT_ANSWER_WITH_SCHEMA";

/// What the model produced for a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    Sql(String),
    Unanswerable,
}

/// Turns a question plus schema description into a candidate SQL statement.
pub trait SqlGenerator: Send + Sync {
    fn generate(
        &self,
        question: &str,
        schema: &str,
    ) -> impl std::future::Future<Output = Result<Generation, AskError>> + Send;
}

/// Classify raw model text: the sentinel, or a (fence-stripped) statement.
pub fn interpret_reply(text: &str) -> Generation {
    let sql = strip_code_fences(text.trim());
    if sql.trim() == CANNOT_ANSWER {
        Generation::Unanswerable
    } else {
        Generation::Sql(sql)
    }
}

/// Remove a surrounding markdown code fence (```` ```sql ... ``` ````).
///
/// Text that does not start with a fence is returned unchanged.
pub fn strip_code_fences(text: &str) -> String {
    if !text.starts_with("```") {
        return text.to_string();
    }

    let mut lines: Vec<&str> = text.lines().skip(1).collect();
    if let Some(last) = lines.pop() {
        let trimmed = last.trim_end();
        if !trimmed.starts_with("```") {
            lines.push(trimmed.strip_suffix("```").unwrap_or(last));
        }
    }
    lines.join("\n").trim().to_string()
}
