//! The n8n workflow document model.
//!
//! Field names follow n8n's JSON representation (`typeVersion`,
//! `staticData`), so a [`WorkflowDocument`] serializes directly into the body
//! the server expects.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Name given to documents that arrive without one.
pub const DEFAULT_WORKFLOW_NAME: &str = "Generated Workflow";

/// Horizontal position of the first node.
pub const POSITION_ORIGIN_X: u64 = 100;

/// Horizontal distance between consecutive default positions.
pub const POSITION_STEP_X: u64 = 200;

/// Vertical coordinate of every default position.
pub const POSITION_Y: u64 = 200;

/// Source node name → opaque channel mapping
/// (`{"main": [[{"node": .., "type": .., "index": ..}]]}`).
pub type ConnectionMap = Map<String, Value>;

// ---------------------------------------------------------------------------
// Node instance
// ---------------------------------------------------------------------------

/// A single configured step within a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInstance {
    /// Identifier, unique within the document by convention only.
    pub id: String,
    /// Display name; connections reference nodes by this name.
    pub name: String,
    /// Catalogue node type identifier.
    #[serde(rename = "type")]
    pub node_type: String,
    /// Node implementation version.  n8n accepts fractional versions.
    pub type_version: Number,
    /// Editor canvas position, purely cosmetic.  Kept as the numbers that
    /// arrived, so integer coordinates stay integers.
    pub position: [Number; 2],
    /// Opaque parameter bag.
    pub parameters: Map<String, Value>,
    /// Node fields this model does not interpret (`credentials`,
    /// `webhookId`, `disabled`, `notes`, ...), carried through as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NodeInstance {
    /// A node with default version, the default position for `index`
    /// (0-based) and no parameters.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        node_type: impl Into<String>,
        index: usize,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            node_type: node_type.into(),
            type_version: Number::from(1),
            position: default_position(index),
            parameters: Map::new(),
            extra: Map::new(),
        }
    }

    pub fn with_parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.parameters = parameters;
        self
    }
}

/// Default canvas position for the node at 0-based `index`.
pub fn default_position(index: usize) -> [Number; 2] {
    let x = POSITION_ORIGIN_X + POSITION_STEP_X * index as u64;
    [Number::from(x), Number::from(POSITION_Y)]
}

// ---------------------------------------------------------------------------
// Workflow document
// ---------------------------------------------------------------------------

/// A complete n8n workflow document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDocument {
    pub name: String,
    pub active: bool,
    pub nodes: Vec<NodeInstance>,
    pub connections: ConnectionMap,
    /// Opaque settings bag.
    pub settings: Value,
    /// Opaque static data bag.
    pub static_data: Value,
    /// Top-level fields this model does not interpret, carried through as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WorkflowDocument {
    /// An empty, inactive document.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active: false,
            nodes: Vec::new(),
            connections: Map::new(),
            settings: Value::Object(Map::new()),
            static_data: Value::Object(Map::new()),
            extra: Map::new(),
        }
    }

    /// Append a node and return its 0-based index.
    pub fn push_node(&mut self, node: NodeInstance) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn node(&self, name: &str) -> Option<&NodeInstance> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.name.as_str())
    }

    /// Number of source entries in the connection map.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Link output `output_index` of node `from` to the first input of `to`.
    ///
    /// n8n stores every output of a node under the `main` key as an array
    /// indexed by output position; missing intermediate outputs are filled
    /// with empty lists.
    pub fn connect(&mut self, from: &str, output_index: usize, to: &str) {
        let entry = self
            .connections
            .entry(from.to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        let channels = object_mut(entry);
        let outputs = array_mut(
            channels
                .entry("main")
                .or_insert_with(|| Value::Array(Vec::new())),
        );
        while outputs.len() <= output_index {
            outputs.push(Value::Array(Vec::new()));
        }
        array_mut(&mut outputs[output_index]).push(serde_json::json!({
            "node": to,
            "type": "main",
            "index": 0,
        }));
    }

    /// Names of nodes directly fed by `from`, across all outputs.
    pub fn targets_of(&self, from: &str) -> Vec<&str> {
        let Some(channels) = self.connections.get(from).and_then(Value::as_object) else {
            return Vec::new();
        };
        channels
            .values()
            .filter_map(Value::as_array)
            .flatten()
            .filter_map(Value::as_array)
            .flatten()
            .filter_map(|target| target.get("node").and_then(Value::as_str))
            .collect()
    }

    /// Serialize into the JSON value sent to the server.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

fn object_mut(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced with an object"),
    }
}

fn array_mut(value: &mut Value) -> &mut Vec<Value> {
    if !value.is_array() {
        *value = Value::Array(Vec::new());
    }
    match value {
        Value::Array(items) => items,
        _ => unreachable!("value was just replaced with an array"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_n8n_field_names() {
        let mut doc = WorkflowDocument::new("Orders");
        doc.push_node(NodeInstance::new("1", "Webhook", "n8n-nodes-base.webhook", 0));
        let v = doc.to_value();
        assert_eq!(v["name"], "Orders");
        assert_eq!(v["active"], false);
        assert_eq!(v["staticData"], json!({}));
        assert_eq!(v["nodes"][0]["type"], "n8n-nodes-base.webhook");
        assert_eq!(v["nodes"][0]["typeVersion"], 1);
        assert_eq!(v["nodes"][0]["position"], json!([100, 200]));
    }

    #[test]
    fn extra_fields_survive_a_round_trip() {
        let raw = json!({
            "name": "x",
            "active": true,
            "nodes": [],
            "connections": {},
            "settings": {"executionOrder": "v1"},
            "staticData": null,
            "tags": ["a"]
        });
        let doc: WorkflowDocument = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(doc.extra["tags"], json!(["a"]));
        assert_eq!(doc.to_value(), raw);
    }

    #[test]
    fn node_fields_outside_the_model_survive_a_round_trip() {
        let raw = json!({
            "id": "1",
            "name": "Slack",
            "type": "n8n-nodes-base.slack",
            "typeVersion": 1,
            "position": [100, 200.5],
            "parameters": {},
            "credentials": {"slackApi": {"id": "7", "name": "Team"}},
            "disabled": true
        });
        let node: NodeInstance = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(node.extra["credentials"]["slackApi"]["id"], "7");
        assert_eq!(node.position[0].as_u64(), Some(100));
        assert_eq!(serde_json::to_value(&node).unwrap(), raw);
    }

    #[test]
    fn connect_builds_n8n_shape() {
        let mut doc = WorkflowDocument::new("x");
        doc.connect("IF", 0, "Slack");
        doc.connect("IF", 1, "Gmail");
        doc.connect("IF", 0, "Log");

        assert_eq!(
            doc.connections["IF"],
            json!({"main": [
                [
                    {"node": "Slack", "type": "main", "index": 0},
                    {"node": "Log", "type": "main", "index": 0}
                ],
                [{"node": "Gmail", "type": "main", "index": 0}]
            ]})
        );
        assert_eq!(doc.connection_count(), 1);
        assert_eq!(doc.targets_of("IF"), vec!["Slack", "Log", "Gmail"]);
        assert!(doc.targets_of("Slack").is_empty());
    }

    #[test]
    fn connect_skips_to_higher_output() {
        let mut doc = WorkflowDocument::new("x");
        doc.connect("Switch", 2, "C");
        assert_eq!(
            doc.connections["Switch"]["main"],
            json!([[], [], [{"node": "C", "type": "main", "index": 0}]])
        );
    }

    #[test]
    fn default_positions_step_horizontally() {
        assert_eq!(json!(default_position(0)), json!([100, 200]));
        assert_eq!(json!(default_position(3)), json!([700, 200]));
    }
}
