//! Response types extracted from n8n payloads.

use serde::Serialize;
use serde_json::Value;

/// A workflow the server has just created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedWorkflow {
    /// Server-assigned identifier.
    pub id: String,
    /// Name as stored by the server, if echoed back.
    pub name: Option<String>,
    /// Editor URL (`{base}/workflow/{id}`).
    pub url: String,
    /// The raw response body.
    pub response: Value,
}

/// One row of a workflow listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowSummary {
    pub id: String,
    pub name: String,
    pub active: bool,
}

impl WorkflowSummary {
    pub fn from_value(value: &Value) -> Option<Self> {
        Some(Self {
            id: value_id(value)?,
            name: value
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned(),
            active: value.get("active").and_then(Value::as_bool).unwrap_or(false),
        })
    }
}

/// The internal REST API wraps payloads in `{"data": ...}`; the public API
/// does not.  Returns the payload either way.
pub fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.len() == 1 && map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// The `id` field of a workflow payload.  Older servers use numeric ids.
pub fn value_id(value: &Value) -> Option<String> {
    match value.get("id")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Workflow entries of a listing payload (`{"data": [...]}` or `[...]`).
pub fn listing_entries(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unwraps_rest_envelope() {
        assert_eq!(unwrap_data(json!({"data": {"id": "1"}})), json!({"id": "1"}));
        assert_eq!(unwrap_data(json!({"id": "1"})), json!({"id": "1"}));
        // `data` alongside other keys is a real field, not an envelope.
        let body = json!({"data": 1, "id": "2"});
        assert_eq!(unwrap_data(body.clone()), body);
    }

    #[test]
    fn ids_may_be_numeric() {
        assert_eq!(value_id(&json!({"id": 42})).as_deref(), Some("42"));
        assert_eq!(value_id(&json!({"id": "abc"})).as_deref(), Some("abc"));
        assert_eq!(value_id(&json!({"id": ""})), None);
        assert_eq!(value_id(&json!({})), None);
    }

    #[test]
    fn listing_accepts_both_shapes() {
        assert_eq!(listing_entries(json!({"data": [{"id": "1"}], "nextCursor": null})).len(), 1);
        assert_eq!(listing_entries(json!([{"id": "1"}, {"id": "2"}])).len(), 2);
        assert!(listing_entries(json!({"unexpected": true})).is_empty());
    }

    #[test]
    fn summary_from_listing_row() {
        let row = json!({"id": "7", "name": "Orders", "active": true, "nodes": []});
        assert_eq!(
            WorkflowSummary::from_value(&row),
            Some(WorkflowSummary {
                id: "7".into(),
                name: "Orders".into(),
                active: true
            })
        );
        assert_eq!(WorkflowSummary::from_value(&json!({"name": "no id"})), None);
    }
}
