//! Extraction of the workflow JSON object from free-form generator output.
//!
//! A fenced code block (```` ```json ```` first, then a bare ```` ``` ````)
//! takes priority; otherwise the span from the first `{` to the last `}` is
//! used.  The result must parse as a JSON object.

use serde_json::Value;

use crate::error::{AgentError, Result};

const FENCE: &str = "```";

/// Characters of a failed candidate quoted back in the error message.
const PREVIEW_CHARS: usize = 200;

/// Extract the first JSON object from `text`.
pub fn extract_json_object(text: &str) -> Result<Value> {
    let mut last_error = None;

    if let Some(fenced) = fenced_block(text) {
        match parse_object(fenced) {
            Ok(value) => return Ok(value),
            Err(e) => last_error = Some(e),
        }
    }

    if let Some(span) = brace_span(text) {
        return parse_object(span);
    }

    Err(last_error.unwrap_or_else(|| AgentError::MalformedGeneration {
        reason: "no JSON object found in generator output".into(),
    }))
}

/// Contents of the first fenced block, preferring one tagged `json`.
fn fenced_block(text: &str) -> Option<&str> {
    let start = match text.find("```json") {
        Some(pos) => pos + "```json".len(),
        None => text.find(FENCE)? + FENCE.len(),
    };
    let rest = &text[start..];
    let end = rest.find(FENCE).unwrap_or(rest.len());
    let block = rest[..end].trim();
    Some(block.strip_prefix("json\n").unwrap_or(block))
}

/// The span from the first `{` through the last `}`.
fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn parse_object(candidate: &str) -> Result<Value> {
    match serde_json::from_str::<Value>(candidate.trim()) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(other) => Err(AgentError::MalformedGeneration {
            reason: format!("expected a JSON object, found {}", json_type(&other)),
        }),
        Err(e) => Err(AgentError::MalformedGeneration {
            reason: format!(
                "invalid JSON: {e}; text: {}",
                candidate.chars().take(PREVIEW_CHARS).collect::<String>()
            ),
        }),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_fence_wins() {
        let text = "Here you go:\n```json\n{\"name\": \"A\"}\n```\nand also {\"name\": \"B\"}";
        assert_eq!(extract_json_object(text).unwrap(), json!({"name": "A"}));
    }

    #[test]
    fn bare_fence_with_json_line() {
        let text = "```\njson\n{\"nodes\": []}\n```";
        assert_eq!(extract_json_object(text).unwrap(), json!({"nodes": []}));
    }

    #[test]
    fn braces_without_fence() {
        let text = "Sure! {\"name\": \"X\", \"nodes\": [{\"id\": \"1\"}]} Hope that helps.";
        let value = extract_json_object(text).unwrap();
        assert_eq!(value["nodes"][0]["id"], "1");
    }

    #[test]
    fn unterminated_fence_runs_to_end() {
        let text = "```json\n{\"name\": \"open\"}";
        assert_eq!(extract_json_object(text).unwrap()["name"], "open");
    }

    #[test]
    fn broken_fence_falls_back_to_braces() {
        let text = "```\nnot json\n```\n{\"name\": \"later\"}";
        assert_eq!(extract_json_object(text).unwrap()["name"], "later");
    }

    #[test]
    fn no_json_is_malformed_generation() {
        let err = extract_json_object("I cannot help with that.").unwrap_err();
        assert!(matches!(err, AgentError::MalformedGeneration { .. }));
    }

    #[test]
    fn array_is_rejected() {
        let err = extract_json_object("```json\n[1, 2]\n```").unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn invalid_json_is_reported() {
        let err = extract_json_object("{ name: unquoted }").unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));
    }
}
