use super::CANNOT_ANSWER;

const INSTRUCTIONS: &str = "You are an expert assistant that converts a natural language question into a SQL SELECT query.\n\
Requirements:\n\
- Only return a single SQL query, no explanation.\n\
- The query MUST be a SELECT statement (no INSERT/UPDATE/DELETE/ALTER/DROP).\n\
- Use the following database schema exactly as given.\n\
- Use standard SQL compatible with SQLite (avoid proprietary functions).\n\
- If the user query cannot be answered with the given schema, respond exactly with: ";

/// Fill the fixed instruction template with a schema description and question.
pub fn build_prompt(question: &str, schema: &str) -> String {
    format!(
        "{INSTRUCTIONS}{CANNOT_ANSWER}\n\nSchema:\n{schema}\n\nUser question:\n{question}\n"
    )
}
