use thiserror::Error;

#[derive(Debug, Error)]
pub enum AskError {
    #[error("unsafe query: {reason}")]
    UnsafeQuery { reason: String },

    #[error("unanswerable: question cannot be answered with the provided schema")]
    Unanswerable,

    #[error("connection: {message}")]
    Connection { message: String },

    #[error("query: {message}")]
    Query { message: String },

    #[error("llm: {message}")]
    Llm { message: String },

    #[error("timeout: request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("config: {message}")]
    Config { message: String },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("format: {message}")]
    Format { message: String },
}
