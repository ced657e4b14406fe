//! JSON recovery from raw model text.
//!
//! The model is asked for `application/json` but still occasionally wraps
//! its answer in markdown fences or conversational prose.

use regex::Regex;
use serde_json::Value;
use shared::error::StackError;
use std::sync::LazyLock;

/// Greedy span from the first `{` to the last `}`. Deliberately not a
/// balanced-brace scanner: unrelated braces around the real object defeat
/// it, and the tests pin that boundary.
static JSON_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("invalid JSON object pattern"));

/// Drop markdown code-fence markers and surrounding whitespace.
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

/// Recover a JSON value from raw model text: strip fences and parse
/// directly, else parse the greedy brace span, else fail.
pub fn extract_json_object(raw: &str) -> Result<Value, StackError> {
    let clean = strip_code_fences(raw);
    if let Ok(value) = serde_json::from_str::<Value>(&clean) {
        return Ok(value);
    }
    let span = JSON_OBJECT.find(&clean).ok_or(StackError::InvalidFormat)?;
    serde_json::from_str(span.as_str()).map_err(|_| StackError::InvalidFormat)
}
