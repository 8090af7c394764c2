use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

// Tag match is case-insensitive and accepts suffixes such as `jsonc`.
static JSON_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)```json\w*\s*(.*?)\s*```").expect("fence pattern is valid"));
// Skips whatever info string follows the opening fence.
static ANY_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[^\n`]*\n(.*?)```").expect("fence pattern is valid"));

/// Outcome of reading structured data out of free model text.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedResponse {
    Parsed(Value),
    ParseFailed(String),
}

/// The candidate JSON text: a ```json fence, else any fence, else everything.
pub fn json_candidate(text: &str) -> &str {
    JSON_FENCE
        .captures(text)
        .or_else(|| ANY_FENCE.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(text)
        .trim()
}

/// Parse the model's answer into a JSON object.
pub fn parse_json_object(text: &str) -> ParsedResponse {
    let candidate = json_candidate(text);
    if candidate.is_empty() {
        return ParsedResponse::ParseFailed("the model returned no text".to_string());
    }

    match serde_json::from_str::<Value>(candidate) {
        Ok(value @ Value::Object(_)) => ParsedResponse::Parsed(value),
        Ok(other) => ParsedResponse::ParseFailed(format!(
            "expected a JSON object, got {}",
            kind_of(&other)
        )),
        Err(e) => ParsedResponse::ParseFailed(e.to_string()),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
