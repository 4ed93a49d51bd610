use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::{Token, Tokenizer, TokenizerError, Whitespace};

/// Keywords that reject a statement wherever they occur in its text.
pub const FORBIDDEN_KEYWORDS: [&str; 10] = [
    "drop", "delete", "alter", "insert", "update", "create", "replace", "truncate", "grant",
    "revoke",
];

/// Why a statement was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialKind {
    NotSelect,
    ForbiddenKeyword,
    ParseFailure,
}

/// A single denial reason.
#[derive(Debug, Clone)]
pub struct DenialReason {
    pub kind: DenialKind,
    pub detail: String,
}

/// Outcome of read-only query validation.
#[derive(Debug)]
pub enum ValidationResult {
    Safe,
    Denied { reason: DenialReason },
}

impl ValidationResult {
    pub fn is_safe(&self) -> bool {
        matches!(self, ValidationResult::Safe)
    }
}

/// Accept or reject a candidate statement. See [`validate`] for the policy.
pub fn is_safe_select(sql: &str) -> bool {
    validate(sql).is_safe()
}

/// Check a generated statement against the read-only policy.
///
/// The checks run in order and the first failure wins:
///
/// 1. comments are stripped, the text trimmed and lower-cased
/// 2. the text must start with `select`
/// 3. no forbidden keyword may appear anywhere in the text, not even inside
///    an identifier or a string literal (`created_at` is rejected)
/// 4. the statement must parse into at least one statement
///
/// This is a textual heuristic. It does not stop data being read from any
/// table the connection can see.
pub fn validate(sql: &str) -> ValidationResult {
    let normalized = match strip_comments(sql) {
        Ok(text) => text.trim().to_lowercase(),
        Err(e) => {
            return denied(
                DenialKind::ParseFailure,
                format!("cannot tokenize query: {}", e),
            );
        }
    };

    if !normalized.starts_with("select") {
        return denied(
            DenialKind::NotSelect,
            "only SELECT statements are allowed".to_string(),
        );
    }

    for kw in FORBIDDEN_KEYWORDS {
        if normalized.contains(kw) {
            return denied(
                DenialKind::ForbiddenKeyword,
                format!("query contains forbidden keyword: {}", kw.to_uppercase()),
            );
        }
    }

    match Parser::parse_sql(&GenericDialect {}, sql) {
        Ok(statements) if !statements.is_empty() => ValidationResult::Safe,
        Ok(_) => denied(
            DenialKind::ParseFailure,
            "query contains no statement".to_string(),
        ),
        Err(e) => denied(
            DenialKind::ParseFailure,
            format!("cannot verify query safety: {}", e),
        ),
    }
}

/// Remove `--` and `/* */` comments, leaving a single space in their place.
///
/// Comment markers inside string literals are not comments and are kept.
pub fn strip_comments(sql: &str) -> Result<String, TokenizerError> {
    let tokens = Tokenizer::new(&GenericDialect {}, sql).tokenize()?;

    let mut out = String::with_capacity(sql.len());
    for token in tokens {
        match token {
            Token::Whitespace(Whitespace::SingleLineComment { .. })
            | Token::Whitespace(Whitespace::MultiLineComment(_)) => out.push(' '),
            other => out.push_str(&other.to_string()),
        }
    }
    Ok(out)
}

fn denied(kind: DenialKind, detail: String) -> ValidationResult {
    ValidationResult::Denied {
        reason: DenialReason { kind, detail },
    }
}
