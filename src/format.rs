use crate::error::AskError;

/// Render result rows as a TOON table.
pub fn to_toon(
    columns: &[String],
    rows: &[serde_json::Map<String, serde_json::Value>],
) -> Result<String, AskError> {
    // toon_format can't infer columns from an empty array, so the header is
    // produced by hand.
    if rows.is_empty() {
        return Ok(format!("[0]{{{}}}:\n", columns.join(",")));
    }

    let array = serde_json::Value::Array(
        rows.iter()
            .cloned()
            .map(serde_json::Value::Object)
            .collect(),
    );

    toon_format::encode_default(&array).map_err(|e| AskError::Format {
        message: e.to_string(),
    })
}

/// Convert key-value pairs to TOON `key: value` lines.
pub fn to_toon_kv(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}: {}", k, v))
        .collect::<Vec<_>>()
        .join("\n")
}
