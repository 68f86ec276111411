//! The node catalogue — read-only registry of known node types.

use std::collections::HashMap;

use serde_json::{Map, Value, json};
use tracing::debug;

use crate::error::{CatalogError, Result};
use crate::nodes::{FALLBACK_NODE_TYPE, NodeCategory, NodeDescriptor, builtin_nodes};

/// Registry of node descriptors keyed by node type identifier.
///
/// Construct once and share (typically behind an `Arc`); there is no way to
/// mutate a catalogue after construction.
#[derive(Debug, Clone)]
pub struct NodeCatalog {
    /// Descriptors in insertion order.
    nodes: Vec<NodeDescriptor>,
    /// Node type identifier → index into `nodes`.
    index: HashMap<String, usize>,
}

impl NodeCatalog {
    /// The built-in n8n catalogue.
    pub fn builtin() -> Self {
        let nodes = builtin_nodes();
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();
        Self { nodes, index }
    }

    /// Build a catalogue from custom descriptors.
    ///
    /// Identifiers must be unique and the fallback generic type must be
    /// present, since the validator relies on it.
    pub fn from_descriptors(nodes: Vec<NodeDescriptor>) -> Result<Self> {
        let mut index = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            if index.insert(node.id.clone(), i).is_some() {
                return Err(CatalogError::DuplicateNodeType {
                    node_type: node.id.clone(),
                });
            }
        }
        if !index.contains_key(FALLBACK_NODE_TYPE) {
            return Err(CatalogError::MissingFallback {
                node_type: FALLBACK_NODE_TYPE.to_owned(),
            });
        }
        debug!(nodes = nodes.len(), "node catalogue built");
        Ok(Self { nodes, index })
    }

    /// Look up a descriptor by node type identifier.
    pub fn get(&self, node_type: &str) -> Option<&NodeDescriptor> {
        self.index.get(node_type).map(|&i| &self.nodes[i])
    }

    /// Like [`get`](Self::get) but fails with
    /// [`CatalogError::UnknownNodeType`].
    pub fn require(&self, node_type: &str) -> Result<&NodeDescriptor> {
        self.get(node_type)
            .ok_or_else(|| CatalogError::UnknownNodeType {
                node_type: node_type.to_owned(),
            })
    }

    pub fn contains(&self, node_type: &str) -> bool {
        self.index.contains_key(node_type)
    }

    /// The fallback generic descriptor.
    pub fn fallback(&self) -> &NodeDescriptor {
        // Presence is checked at construction.
        &self.nodes[self.index[FALLBACK_NODE_TYPE]]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All descriptors in catalogue order.
    pub fn iter(&self) -> impl Iterator<Item = &NodeDescriptor> {
        self.nodes.iter()
    }

    /// Descriptors in the given category, in catalogue order.
    pub fn by_category(&self, category: NodeCategory) -> Vec<&NodeDescriptor> {
        self.nodes
            .iter()
            .filter(|n| n.category == category)
            .collect()
    }

    /// Node types whose use-case hints mention any of `keywords`
    /// (case-insensitive substring match).
    pub fn find_by_use_case(&self, keywords: &[&str]) -> Vec<&NodeDescriptor> {
        let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
        self.nodes
            .iter()
            .filter(|node| {
                let text = node.use_cases.join(" ").to_lowercase();
                keywords.iter().any(|k| text.contains(k.as_str()))
            })
            .collect()
    }

    /// Build a node instance skeleton for `node_type`.
    ///
    /// Parameters start from the descriptor's example configuration and are
    /// then overridden key by key by `overrides`.  Returns `None` for
    /// unknown types.
    pub fn instantiate(&self, node_type: &str, overrides: Option<&Map<String, Value>>) -> Option<Value> {
        let node = self.get(node_type)?;

        let mut parameters = match &node.example_config {
            Some(Value::Object(example)) => example.clone(),
            _ => Map::new(),
        };
        if let Some(overrides) = overrides {
            for (key, value) in overrides {
                parameters.insert(key.clone(), value.clone());
            }
        }

        Some(json!({
            "id": "temp_id",
            "name": node.display_name,
            "type": node.id,
            "typeVersion": 1,
            "position": [0, 0],
            "parameters": parameters,
        }))
    }
}

impl Default for NodeCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalogue_lookup() {
        let catalog = NodeCatalog::builtin();
        assert_eq!(catalog.len(), 11);
        let webhook = catalog.get("n8n-nodes-base.webhook").unwrap();
        assert_eq!(webhook.category, NodeCategory::Trigger);
        assert!(catalog.get("n8n-nodes-base.nope").is_none());
        assert!(catalog.require("n8n-nodes-base.nope").is_err());
        assert_eq!(catalog.fallback().id, FALLBACK_NODE_TYPE);
    }

    #[test]
    fn categories_partition_catalogue() {
        let catalog = NodeCatalog::builtin();
        let triggers = catalog.by_category(NodeCategory::Trigger);
        let regular = catalog.by_category(NodeCategory::Regular);
        assert_eq!(triggers.len(), 2);
        assert_eq!(triggers.len() + regular.len(), catalog.len());
    }

    #[test]
    fn find_by_use_case_is_case_insensitive() {
        let catalog = NodeCatalog::builtin();
        let ids: Vec<&str> = catalog
            .find_by_use_case(&["NOTIFICATIONS"])
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        assert!(ids.contains(&"n8n-nodes-base.gmail"));
        assert!(ids.contains(&"n8n-nodes-base.slack"));
    }

    #[test]
    fn instantiate_merges_example_and_overrides() {
        let catalog = NodeCatalog::builtin();
        let mut overrides = Map::new();
        overrides.insert("path".into(), json!("orders"));

        let node = catalog
            .instantiate("n8n-nodes-base.webhook", Some(&overrides))
            .unwrap();
        assert_eq!(node["name"], "Webhook");
        assert_eq!(node["parameters"]["path"], "orders");
        assert_eq!(node["parameters"]["httpMethod"], "POST");
        assert!(catalog.instantiate("unknown.type", None).is_none());
    }

    #[test]
    fn from_descriptors_rejects_duplicates() {
        let mut nodes = builtin_nodes();
        nodes.push(nodes[0].clone());
        let err = NodeCatalog::from_descriptors(nodes).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateNodeType { .. }));
    }

    #[test]
    fn from_descriptors_requires_fallback() {
        let nodes: Vec<_> = builtin_nodes()
            .into_iter()
            .filter(|n| n.id != FALLBACK_NODE_TYPE)
            .collect();
        let err = NodeCatalog::from_descriptors(nodes).unwrap_err();
        assert!(matches!(err, CatalogError::MissingFallback { .. }));
    }
}
