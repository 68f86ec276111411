//! Structural validation and normalization of raw workflow documents.
//!
//! [`validate`] never fails.  Any JSON value is turned into a well-formed
//! [`WorkflowDocument`] by filling defaults, replacing node types the
//! catalogue does not know with the fallback generic type, and dropping
//! connection entries whose source is not a node.  Every change is recorded
//! as a [`Correction`] so callers can see exactly which defaults fired.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use flowsmith_catalog::NodeCatalog;
use serde::Serialize;
use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::document::{DEFAULT_WORKFLOW_NAME, NodeInstance, WorkflowDocument, default_position};

/// Top-level keys interpreted by the document model.
const KNOWN_FIELDS: &[&str] = &[
    "name",
    "active",
    "nodes",
    "connections",
    "settings",
    "staticData",
];

/// Node keys interpreted by [`NodeInstance`].
const KNOWN_NODE_FIELDS: &[&str] = &[
    "id",
    "name",
    "type",
    "typeVersion",
    "position",
    "parameters",
];

// ---------------------------------------------------------------------------
// Corrections
// ---------------------------------------------------------------------------

/// A top-level document field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentField {
    Name,
    Active,
    Nodes,
    Connections,
    Settings,
    StaticData,
}

impl DocumentField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Active => "active",
            Self::Nodes => "nodes",
            Self::Connections => "connections",
            Self::Settings => "settings",
            Self::StaticData => "staticData",
        }
    }
}

/// A field of a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeField {
    Id,
    Name,
    Type,
    TypeVersion,
    Position,
    Parameters,
}

impl NodeField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Type => "type",
            Self::TypeVersion => "typeVersion",
            Self::Position => "position",
            Self::Parameters => "parameters",
        }
    }
}

/// One change applied (or one problem found) while validating.
///
/// Node positions are 1-based, matching the default ids and names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Correction {
    /// The input was not a JSON object; it was treated as `{}`.
    DocumentNotAnObject,

    /// A top-level field was absent and got its default.
    MissingField { field: DocumentField },

    /// A top-level field had the wrong shape and was replaced by its default.
    InvalidField { field: DocumentField },

    /// A `nodes` entry was not an object; it was treated as `{}`.
    NodeNotAnObject { position: usize },

    /// A node field was absent and got its default.
    MissingNodeField { position: usize, field: NodeField },

    /// A node field had the wrong shape and was replaced by its default.
    InvalidNodeField { position: usize, field: NodeField },

    /// A numeric node id was converted to its string form.
    StringifiedNodeId { position: usize },

    /// The node type is not in the catalogue; the node became the fallback
    /// generic type and was renamed.
    UnknownNodeType {
        position: usize,
        original_type: String,
        renamed_to: String,
    },

    /// A connection entry whose source is not a node name was removed.
    DroppedConnection { source: String },

    /// Several nodes share a name.  Reported only; the document is unchanged.
    DuplicateNodeName { name: String, positions: Vec<usize> },
}

impl Correction {
    /// Whether this correction altered the document (as opposed to only
    /// reporting a problem).
    pub fn changes_document(&self) -> bool {
        !matches!(self, Self::DuplicateNodeName { .. })
    }
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DocumentNotAnObject => write!(f, "document is not an object, treated as empty"),
            Self::MissingField { field } => write!(f, "`{}` missing, default applied", field.as_str()),
            Self::InvalidField { field } => {
                write!(f, "`{}` has the wrong shape, default applied", field.as_str())
            }
            Self::NodeNotAnObject { position } => {
                write!(f, "node {position} is not an object, treated as empty")
            }
            Self::MissingNodeField { position, field } => {
                write!(f, "node {position}: `{}` missing, default applied", field.as_str())
            }
            Self::InvalidNodeField { position, field } => write!(
                f,
                "node {position}: `{}` has the wrong shape, default applied",
                field.as_str()
            ),
            Self::StringifiedNodeId { position } => {
                write!(f, "node {position}: numeric id converted to string")
            }
            Self::UnknownNodeType {
                position,
                original_type,
                renamed_to,
            } => write!(
                f,
                "node {position}: unknown type `{original_type}` replaced, renamed to `{renamed_to}`"
            ),
            Self::DroppedConnection { source } => {
                write!(f, "connection from unknown node `{source}` dropped")
            }
            Self::DuplicateNodeName { name, positions } => {
                write!(f, "node name `{name}` used by nodes {positions:?}")
            }
        }
    }
}

/// Output of [`validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Validated {
    pub document: WorkflowDocument,
    pub corrections: Vec<Correction>,
}

impl Validated {
    /// `true` when the input needed no change at all.
    pub fn is_clean(&self) -> bool {
        !self.corrections.iter().any(Correction::changes_document)
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate and normalize a raw workflow document against `catalog`.
pub fn validate(raw: &Value, catalog: &NodeCatalog) -> Validated {
    let mut corrections = Vec::new();
    let empty = Map::new();

    let top = match raw.as_object() {
        Some(map) => map,
        None => {
            corrections.push(Correction::DocumentNotAnObject);
            &empty
        }
    };

    let name = match top.get("name") {
        Some(Value::String(name)) if !name.trim().is_empty() => name.clone(),
        other => {
            corrections.push(field_correction(other, DocumentField::Name));
            DEFAULT_WORKFLOW_NAME.to_owned()
        }
    };

    let raw_nodes: &[Value] = match top.get("nodes") {
        Some(Value::Array(items)) => items,
        other => {
            corrections.push(field_correction(other, DocumentField::Nodes));
            &[]
        }
    };

    let fallback_type = catalog.fallback().id.as_str();
    let nodes: Vec<NodeInstance> = raw_nodes
        .iter()
        .enumerate()
        .map(|(index, raw)| validate_node(raw, index, catalog, fallback_type, &mut corrections))
        .collect();

    let connections = match top.get("connections") {
        Some(Value::Object(entries)) => {
            let names: HashSet<&str> = nodes.iter().map(|n| n.name.as_str()).collect();
            let mut kept = Map::new();
            for (source, channels) in entries {
                if names.contains(source.as_str()) {
                    kept.insert(source.clone(), channels.clone());
                } else {
                    corrections.push(Correction::DroppedConnection {
                        source: source.clone(),
                    });
                }
            }
            kept
        }
        other => {
            corrections.push(field_correction(other, DocumentField::Connections));
            Map::new()
        }
    };

    let active = match top.get("active") {
        Some(Value::Bool(active)) => *active,
        other => {
            corrections.push(field_correction(other, DocumentField::Active));
            false
        }
    };

    // Opaque bags: only absence is corrected.
    let mut opaque = |key: &str, field: DocumentField| match top.get(key) {
        Some(value) => value.clone(),
        None => {
            corrections.push(Correction::MissingField { field });
            Value::Object(Map::new())
        }
    };
    let settings = opaque("settings", DocumentField::Settings);
    let static_data = opaque("staticData", DocumentField::StaticData);

    let extra: Map<String, Value> = top
        .iter()
        .filter(|(key, _)| !KNOWN_FIELDS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    corrections.extend(duplicate_names(&nodes));

    debug!(
        nodes = nodes.len(),
        connections = connections.len(),
        corrections = corrections.len(),
        "workflow document validated"
    );

    Validated {
        document: WorkflowDocument {
            name,
            active,
            nodes,
            connections,
            settings,
            static_data,
            extra,
        },
        corrections,
    }
}

fn field_correction(found: Option<&Value>, field: DocumentField) -> Correction {
    match found {
        Some(_) => Correction::InvalidField { field },
        None => Correction::MissingField { field },
    }
}

fn node_field_correction(found: Option<&Value>, position: usize, field: NodeField) -> Correction {
    match found {
        Some(_) => Correction::InvalidNodeField { position, field },
        None => Correction::MissingNodeField { position, field },
    }
}

fn validate_node(
    raw: &Value,
    index: usize,
    catalog: &NodeCatalog,
    fallback_type: &str,
    corrections: &mut Vec<Correction>,
) -> NodeInstance {
    let position = index + 1;
    let empty = Map::new();
    let node = match raw.as_object() {
        Some(map) => map,
        None => {
            corrections.push(Correction::NodeNotAnObject { position });
            &empty
        }
    };

    let id = match node.get("id") {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Number(id)) => {
            corrections.push(Correction::StringifiedNodeId { position });
            id.to_string()
        }
        other => {
            corrections.push(node_field_correction(other, position, NodeField::Id));
            position.to_string()
        }
    };

    let mut name = match node.get("name") {
        Some(Value::String(name)) if !name.trim().is_empty() => name.clone(),
        other => {
            corrections.push(node_field_correction(other, position, NodeField::Name));
            format!("Node {position}")
        }
    };

    let mut node_type = match node.get("type") {
        Some(Value::String(t)) if !t.trim().is_empty() => t.clone(),
        other => {
            corrections.push(node_field_correction(other, position, NodeField::Type));
            fallback_type.to_owned()
        }
    };

    let type_version = match node.get("typeVersion") {
        Some(Value::Number(version)) => version.clone(),
        other => {
            corrections.push(node_field_correction(other, position, NodeField::TypeVersion));
            Number::from(1)
        }
    };

    let coordinates = match node.get("position") {
        Some(Value::Array(xy)) if xy.len() == 2 => match (&xy[0], &xy[1]) {
            (Value::Number(x), Value::Number(y)) => Some([x.clone(), y.clone()]),
            _ => None,
        },
        _ => None,
    };
    let canvas_position = match coordinates {
        Some(xy) => xy,
        None => {
            corrections.push(node_field_correction(
                node.get("position"),
                position,
                NodeField::Position,
            ));
            default_position(index)
        }
    };

    let parameters = match node.get("parameters") {
        Some(Value::Object(parameters)) => parameters.clone(),
        other => {
            corrections.push(node_field_correction(other, position, NodeField::Parameters));
            Map::new()
        }
    };

    if !catalog.contains(&node_type) {
        let renamed_to = format!("Set {position}");
        debug!(
            position,
            node_type = %node_type,
            "unknown node type replaced with fallback"
        );
        corrections.push(Correction::UnknownNodeType {
            position,
            original_type: std::mem::replace(&mut node_type, fallback_type.to_owned()),
            renamed_to: renamed_to.clone(),
        });
        name = renamed_to;
    }

    let extra: Map<String, Value> = node
        .iter()
        .filter(|(key, _)| !KNOWN_NODE_FIELDS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    NodeInstance {
        id,
        name,
        node_type,
        type_version,
        position: canvas_position,
        parameters,
        extra,
    }
}

fn duplicate_names(nodes: &[NodeInstance]) -> Vec<Correction> {
    let mut seen: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (index, node) in nodes.iter().enumerate() {
        seen.entry(node.name.as_str()).or_default().push(index + 1);
    }
    seen.into_iter()
        .filter(|(_, positions)| positions.len() > 1)
        .map(|(name, positions)| Correction::DuplicateNodeName {
            name: name.to_owned(),
            positions,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
