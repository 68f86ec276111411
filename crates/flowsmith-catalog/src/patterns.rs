//! Predefined workflow shapes used as generation hints.

use serde::{Deserialize, Serialize};

use crate::catalog::NodeCatalog;
use crate::error::{CatalogError, Result};

/// Identifiers of the built-in patterns.
pub const WEBHOOK_TO_ACTION: &str = "webhook_to_action";
pub const SCHEDULED_DATA_SYNC: &str = "scheduled_data_sync";
pub const CONDITIONAL_NOTIFICATION: &str = "conditional_notification";
pub const API_TO_MULTIPLE_DESTINATIONS: &str = "api_to_multiple_destinations";

/// An abstract edge between two pattern nodes, addressed by index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRule {
    pub from: usize,
    pub to: usize,
    /// Output channel of the source node; `None` means `main`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl ConnectionRule {
    fn new(from: usize, to: usize) -> Self {
        Self {
            from,
            to,
            output: None,
        }
    }

    fn via(from: usize, to: usize, output: &str) -> Self {
        Self {
            from,
            to,
            output: Some(output.to_owned()),
        }
    }
}

/// A template workflow shape: ordered node types plus topology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowPattern {
    pub id: String,
    pub description: String,
    /// Node type identifiers in pattern order.
    pub nodes: Vec<String>,
    pub connections: Vec<ConnectionRule>,
    pub use_case: String,
}

impl WorkflowPattern {
    /// Check that every node type exists in `catalog` and every rule
    /// references valid indices and declared output channels.
    pub fn check(&self, catalog: &NodeCatalog) -> Result<()> {
        let invalid = |reason: String| CatalogError::InvalidPattern {
            pattern_id: self.id.clone(),
            reason,
        };

        for node_type in &self.nodes {
            if !catalog.contains(node_type) {
                return Err(invalid(format!("unknown node type `{node_type}`")));
            }
        }
        for rule in &self.connections {
            let source = self
                .nodes
                .get(rule.from)
                .ok_or_else(|| invalid(format!("source index {} out of range", rule.from)))?;
            if rule.to >= self.nodes.len() {
                return Err(invalid(format!("target index {} out of range", rule.to)));
            }
            if let Some(channel) = &rule.output {
                let declared = catalog
                    .get(source)
                    .and_then(|n| n.output_index(channel))
                    .is_some();
                if !declared {
                    return Err(invalid(format!(
                        "`{source}` has no output channel `{channel}`"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// The fixed set of workflow patterns.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<WorkflowPattern>,
}

impl PatternSet {
    pub fn builtin() -> Self {
        let pattern = |id: &str,
                       description: &str,
                       nodes: &[&str],
                       connections: Vec<ConnectionRule>,
                       use_case: &str| WorkflowPattern {
            id: id.to_owned(),
            description: description.to_owned(),
            nodes: nodes.iter().map(|n| (*n).to_owned()).collect(),
            connections,
            use_case: use_case.to_owned(),
        };

        Self {
            patterns: vec![
                pattern(
                    WEBHOOK_TO_ACTION,
                    "Receive a webhook and perform an action",
                    &["n8n-nodes-base.webhook", "n8n-nodes-base.set"],
                    vec![ConnectionRule::new(0, 1)],
                    "Simple handling of incoming data",
                ),
                pattern(
                    SCHEDULED_DATA_SYNC,
                    "Periodic data synchronization",
                    &[
                        "n8n-nodes-base.schedule",
                        "n8n-nodes-base.httpRequest",
                        "n8n-nodes-base.googleSheets",
                    ],
                    vec![ConnectionRule::new(0, 1), ConnectionRule::new(1, 2)],
                    "Regularly fetch and store data",
                ),
                pattern(
                    CONDITIONAL_NOTIFICATION,
                    "Conditional notifications",
                    &[
                        "n8n-nodes-base.webhook",
                        "n8n-nodes-base.if",
                        "n8n-nodes-base.slack",
                        "n8n-nodes-base.gmail",
                    ],
                    vec![
                        ConnectionRule::new(0, 1),
                        ConnectionRule::via(1, 2, "main"),
                        ConnectionRule::via(1, 3, "fallback"),
                    ],
                    "Different notifications depending on a condition",
                ),
                pattern(
                    API_TO_MULTIPLE_DESTINATIONS,
                    "Fetch data and send it to several destinations",
                    &[
                        "n8n-nodes-base.httpRequest",
                        "n8n-nodes-base.set",
                        "n8n-nodes-base.googleSheets",
                        "n8n-nodes-base.slack",
                    ],
                    vec![
                        ConnectionRule::new(0, 1),
                        ConnectionRule::new(1, 2),
                        ConnectionRule::new(1, 3),
                    ],
                    "Distribute data across systems",
                ),
            ],
        }
    }

    pub fn get(&self, id: &str) -> Option<&WorkflowPattern> {
        self.patterns.iter().find(|p| p.id == id)
    }

    pub fn require(&self, id: &str) -> Result<&WorkflowPattern> {
        self.get(id).ok_or_else(|| CatalogError::UnknownPattern {
            pattern_id: id.to_owned(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorkflowPattern> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::builtin()
    }
}
