//! Lenient parse of a textual LLM payload.
//!
//! Model output is free-form: the JSON document may arrive bare, wrapped in a
//! Markdown code fence, or embedded in prose. This parse is best-effort and
//! total — anything unrecoverable yields `Value::Null`, and the normalizer
//! downstream treats `Null` like any other wrong shape.

use serde_json::Value;
use tracing::debug;

/// Extract a structured value from raw agent text. Never fails.
pub fn parse_text_payload(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return value;
    }

    if let Some(fenced) = strip_code_fence(trimmed) {
        if let Ok(value) = serde_json::from_str::<Value>(fenced) {
            return value;
        }
    }

    // Last resort: the widest brace/bracket-delimited slice.
    for (open, close) in [('{', '}'), ('[', ']')] {
        if let Some(slice) = delimited_slice(trimmed, open, close) {
            if let Ok(value) = serde_json::from_str::<Value>(slice) {
                return value;
            }
        }
    }

    debug!(len = raw.len(), "agent payload did not contain parsable JSON");
    Value::Null
}

/// The body of the first ``` fence, with an optional language tag skipped.
fn strip_code_fence(text: &str) -> Option<&str> {
    let start = text.find("```")? + 3;
    let rest = &text[start..];
    let body_start = rest.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &rest[body_start..];
    let end = body.find("```")?;
    Some(body[..end].trim())
}

fn delimited_slice(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}
