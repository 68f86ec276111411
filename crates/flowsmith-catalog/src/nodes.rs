//! Node descriptors and the built-in n8n node set.
//!
//! A [`NodeDescriptor`] is pure data: what the node is called, which category
//! it belongs to, the parameters it accepts and the output channels it
//! exposes.  Descriptors are built once when the catalogue is created and are
//! never mutated afterwards.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Node type substituted whenever a requested type is unrecognized.
pub const FALLBACK_NODE_TYPE: &str = "n8n-nodes-base.set";

/// Name of the default output channel every node exposes.
pub const MAIN_CHANNEL: &str = "main";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Whether a node starts a workflow or runs inside one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeCategory {
    /// Starts a workflow (webhook, schedule).
    Trigger,
    /// Any step that runs after a trigger.
    Regular,
}

impl NodeCategory {
    /// Lower-case label used in prompts and CLI output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trigger => "trigger",
            Self::Regular => "regular",
        }
    }
}

impl std::fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared type of a node parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParamKind {
    String,
    Number,
    Options,
    Json,
    Array,
    Collection,
    FixedCollection,
}

/// Advisory schema for a single node parameter.
///
/// The validator never enforces these; they exist for prompt context and
/// for catalogue listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Declared parameter type.
    pub kind: ParamKind,
    /// Allowed values for [`ParamKind::Options`] parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Whether n8n requires the parameter to be set.
    #[serde(default)]
    pub required: bool,
    /// Short human description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ParamSpec {
    fn of(kind: ParamKind) -> Self {
        Self {
            kind,
            options: Vec::new(),
            required: false,
            description: None,
        }
    }

    pub fn string() -> Self {
        Self::of(ParamKind::String)
    }

    pub fn number() -> Self {
        Self::of(ParamKind::Number)
    }

    pub fn json() -> Self {
        Self::of(ParamKind::Json)
    }

    pub fn array() -> Self {
        Self::of(ParamKind::Array)
    }

    pub fn collection() -> Self {
        Self::of(ParamKind::Collection)
    }

    pub fn fixed_collection() -> Self {
        Self::of(ParamKind::FixedCollection)
    }

    /// An options parameter restricted to `values`.
    pub fn options(values: &[&str]) -> Self {
        Self {
            options: values.iter().map(|v| (*v).to_owned()).collect(),
            ..Self::of(ParamKind::Options)
        }
    }

    /// Mark the parameter as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Attach a human description.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A catalogue entry describing one n8n node type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    /// Globally unique node type identifier (e.g. `n8n-nodes-base.webhook`).
    pub id: String,
    /// Explicit category; never derived from the identifier.
    pub category: NodeCategory,
    /// Name shown in the n8n editor.
    pub display_name: String,
    /// What the node does.
    pub description: String,
    /// Parameter name → advisory schema.
    pub parameters: BTreeMap<String, ParamSpec>,
    /// Ordered output channel names.
    pub outputs: Vec<String>,
    /// Short phrases describing typical uses, searched by keyword.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub use_cases: Vec<String>,
    /// Example parameter configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_config: Option<Value>,
    /// Credential type the node needs on the server, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

impl NodeDescriptor {
    /// Start a descriptor with a single `main` output and no parameters.
    pub fn new(
        id: impl Into<String>,
        category: NodeCategory,
        display_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            category,
            display_name: display_name.into(),
            description: description.into(),
            parameters: BTreeMap::new(),
            outputs: vec![MAIN_CHANNEL.to_owned()],
            use_cases: Vec::new(),
            example_config: None,
            credential: None,
        }
    }

    pub fn param(mut self, name: impl Into<String>, spec: ParamSpec) -> Self {
        self.parameters.insert(name.into(), spec);
        self
    }

    pub fn outputs(mut self, outputs: &[&str]) -> Self {
        self.outputs = outputs.iter().map(|o| (*o).to_owned()).collect();
        self
    }

    pub fn use_cases(mut self, use_cases: &[&str]) -> Self {
        self.use_cases = use_cases.iter().map(|u| (*u).to_owned()).collect();
        self
    }

    pub fn example(mut self, config: Value) -> Self {
        self.example_config = Some(config);
        self
    }

    pub fn credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    /// Position of `channel` among this node's outputs.
    pub fn output_index(&self, channel: &str) -> Option<usize> {
        self.outputs.iter().position(|o| o == channel)
    }

    /// Names of parameters declared as required.
    pub fn required_parameters(&self) -> impl Iterator<Item = &str> {
        self.parameters
            .iter()
            .filter(|(_, spec)| spec.required)
            .map(|(name, _)| name.as_str())
    }
}

// ---------------------------------------------------------------------------
// Built-in node set
// ---------------------------------------------------------------------------

const HTTP_METHODS: &[&str] = &["GET", "POST", "PUT", "DELETE", "PATCH"];

/// The built-in descriptors, in catalogue order.
///
/// Triggers come first so that catalogue excerpts shown to the generator
/// always include them.
pub fn builtin_nodes() -> Vec<NodeDescriptor> {
    vec![
        // -- Triggers ---------------------------------------------------------
        NodeDescriptor::new(
            "n8n-nodes-base.webhook",
            NodeCategory::Trigger,
            "Webhook",
            "Receives HTTP requests that start the workflow",
        )
        .param("httpMethod", ParamSpec::options(HTTP_METHODS))
        .param("path", ParamSpec::string().describe("URL path of the webhook"))
        .param(
            "authentication",
            ParamSpec::options(&["none", "basicAuth", "headerAuth"]),
        )
        .use_cases(&[
            "receive data from external systems",
            "third-party integrations",
            "start automatically on events",
        ])
        .example(json!({
            "httpMethod": "POST",
            "path": "webhook-data",
            "authentication": "none"
        })),
        NodeDescriptor::new(
            "n8n-nodes-base.schedule",
            NodeCategory::Trigger,
            "Schedule Trigger",
            "Starts the workflow on a schedule",
        )
        .param("rule", ParamSpec::options(&["interval", "cron"]))
        .param("interval", ParamSpec::number().describe("Interval in minutes"))
        .param("cronExpression", ParamSpec::string().describe("Cron expression"))
        .use_cases(&[
            "regular data processing",
            "periodic reports",
            "automatic synchronization",
        ])
        .example(json!({
            "rule": "interval",
            "interval": 60
        })),
        // -- HTTP -------------------------------------------------------------
        NodeDescriptor::new(
            "n8n-nodes-base.httpRequest",
            NodeCategory::Regular,
            "HTTP Request",
            "Performs HTTP requests against an API",
        )
        .param("url", ParamSpec::string().required())
        .param("method", ParamSpec::options(HTTP_METHODS))
        .param("headers", ParamSpec::fixed_collection().describe("HTTP headers"))
        .param("body", ParamSpec::json().describe("Request body"))
        .param(
            "authentication",
            ParamSpec::options(&["none", "basicAuth", "oAuth2", "apiKey"]),
        )
        .use_cases(&[
            "REST API integration",
            "fetch data from services",
            "send data to systems",
        ])
        .example(json!({
            "url": "https://api.example.com/data",
            "method": "GET",
            "headers": {"Content-Type": "application/json"}
        })),
        // -- Google services --------------------------------------------------
        NodeDescriptor::new(
            "n8n-nodes-base.googleSheets",
            NodeCategory::Regular,
            "Google Sheets",
            "Reads and writes Google Sheets spreadsheets",
        )
        .param(
            "operation",
            ParamSpec::options(&["append", "read", "update", "clear"]),
        )
        .param("sheetId", ParamSpec::string().required())
        .param("range", ParamSpec::string().describe("Cell range (A1:C10)"))
        .param("values", ParamSpec::array().describe("Rows to write"))
        .use_cases(&[
            "store data in spreadsheets",
            "read configuration",
            "build reports",
        ])
        .example(json!({
            "operation": "append",
            "sheetId": "your_sheet_id",
            "range": "A:C"
        }))
        .credential("googleSheetsOAuth2Api"),
        NodeDescriptor::new(
            "n8n-nodes-base.gmail",
            NodeCategory::Regular,
            "Gmail",
            "Sends and receives email through Gmail",
        )
        .param("operation", ParamSpec::options(&["send", "get", "getAll"]))
        .param("to", ParamSpec::string().describe("Recipient address"))
        .param("subject", ParamSpec::string().describe("Message subject"))
        .param("message", ParamSpec::string().describe("Message body"))
        .param("attachments", ParamSpec::fixed_collection().describe("Attachments"))
        .use_cases(&[
            "send notifications",
            "automatic email reports",
            "process incoming mail",
        ])
        .credential("gmailOAuth2"),
        // -- Communication ----------------------------------------------------
        NodeDescriptor::new(
            "n8n-nodes-base.slack",
            NodeCategory::Regular,
            "Slack",
            "Posts and manages Slack messages",
        )
        .param(
            "operation",
            ParamSpec::options(&["postMessage", "update", "get"]),
        )
        .param("channel", ParamSpec::string().describe("Slack channel"))
        .param("text", ParamSpec::string().describe("Message text"))
        .param("username", ParamSpec::string().describe("Bot name"))
        .param("attachments", ParamSpec::fixed_collection().describe("Attachments"))
        .use_cases(&["team notifications", "system alerts", "interactive bots"])
        .example(json!({
            "operation": "postMessage",
            "channel": "#notifications",
            "text": "New event: {{ $json.data }}"
        }))
        .credential("slackApi"),
        // -- Data processing --------------------------------------------------
        NodeDescriptor::new(
            FALLBACK_NODE_TYPE,
            NodeCategory::Regular,
            "Set",
            "Sets and modifies item fields",
        )
        .param("values", ParamSpec::fixed_collection().describe("Fields to set"))
        .param("options", ParamSpec::collection().describe("Additional options"))
        .use_cases(&["transform data", "add fields", "reshape items"])
        .example(json!({
            "values": {
                "string": [
                    {"name": "processed_at", "value": "{{ $now }}"},
                    {"name": "status", "value": "completed"}
                ]
            }
        })),
        NodeDescriptor::new(
            "n8n-nodes-base.if",
            NodeCategory::Regular,
            "IF",
            "Routes items by a condition",
        )
        .param(
            "conditions",
            ParamSpec::fixed_collection().describe("Conditions to check"),
        )
        .param("combineOperation", ParamSpec::options(&["any", "all"]))
        .outputs(&["main", "fallback"])
        .use_cases(&["conditional processing", "filter data", "branch logic"]),
        NodeDescriptor::new(
            "n8n-nodes-base.switch",
            NodeCategory::Regular,
            "Switch",
            "Routes items to one of several branches",
        )
        .param("mode", ParamSpec::options(&["expression", "rules"]))
        .param("value", ParamSpec::string().describe("Value to compare"))
        .param("rules", ParamSpec::fixed_collection().describe("Routing rules"))
        .outputs(&["main", "fallback"])
        .use_cases(&[
            "route data",
            "multiple conditions",
            "handle different item types",
        ]),
        // -- Utilities --------------------------------------------------------
        NodeDescriptor::new(
            "n8n-nodes-base.merge",
            NodeCategory::Regular,
            "Merge",
            "Combines data from several inputs",
        )
        .param("mode", ParamSpec::options(&["append", "merge", "multiplex"]))
        .param("joinMode", ParamSpec::options(&["inner", "left", "outer"]))
        .use_cases(&["combine data", "synchronize branches", "aggregate results"]),
        NodeDescriptor::new(
            "n8n-nodes-base.wait",
            NodeCategory::Regular,
            "Wait",
            "Pauses workflow execution",
        )
        .param("amount", ParamSpec::number().describe("How long to wait"))
        .param(
            "unit",
            ParamSpec::options(&["seconds", "minutes", "hours", "days"]),
        )
        .use_cases(&[
            "delay processing",
            "wait for external events",
            "throttle requests",
        ]),
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_contains_fallback() {
        assert!(builtin_nodes().iter().any(|n| n.id == FALLBACK_NODE_TYPE));
    }

    #[test]
    fn branching_nodes_expose_fallback_channel() {
        let nodes = builtin_nodes();
        let if_node = nodes.iter().find(|n| n.id == "n8n-nodes-base.if").unwrap();
        assert_eq!(if_node.output_index("main"), Some(0));
        assert_eq!(if_node.output_index("fallback"), Some(1));
        assert_eq!(if_node.output_index("error"), None);
    }

    #[test]
    fn required_parameters_are_listed() {
        let nodes = builtin_nodes();
        let http = nodes
            .iter()
            .find(|n| n.id == "n8n-nodes-base.httpRequest")
            .unwrap();
        let required: Vec<&str> = http.required_parameters().collect();
        assert_eq!(required, vec!["url"]);
    }

    #[test]
    fn param_spec_serializes_camel_case_kind() {
        let spec = ParamSpec::fixed_collection();
        let v = serde_json::to_value(&spec).unwrap();
        assert_eq!(v["kind"], "fixedCollection");
        assert!(v.get("options").is_none());
    }
}
