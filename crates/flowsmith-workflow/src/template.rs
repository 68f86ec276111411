//! Rendering workflow patterns into concrete documents.

use std::collections::HashMap;

use flowsmith_catalog::{MAIN_CHANNEL, NodeCatalog, WorkflowPattern};
use tracing::warn;

use crate::document::{NodeInstance, WorkflowDocument, default_position};

/// Build a node for `node_type` at 0-based `index` from the catalogue's
/// instance skeleton (example configuration as parameters).
///
/// Returns `None` when the type is unknown to `catalog`.
pub fn instantiate_node(catalog: &NodeCatalog, node_type: &str, index: usize) -> Option<NodeInstance> {
    let skeleton = catalog.instantiate(node_type, None)?;
    let mut node: NodeInstance = serde_json::from_value(skeleton).ok()?;
    node.id = (index + 1).to_string();
    node.position = default_position(index);
    Some(node)
}

/// Render `pattern` into a document named `name`.
///
/// Nodes take their catalogue display names (suffixed with a counter when a
/// type repeats) and example parameters.  Pattern node types missing from
/// the catalogue are rendered as the fallback type.  Connection rules are
/// resolved to output indices through each source node's declared channels.
pub fn render_pattern(
    pattern: &WorkflowPattern,
    catalog: &NodeCatalog,
    name: &str,
) -> WorkflowDocument {
    let mut document = WorkflowDocument::new(name);
    let mut used: HashMap<String, usize> = HashMap::new();

    for (index, node_type) in pattern.nodes.iter().enumerate() {
        let mut node = match instantiate_node(catalog, node_type, index) {
            Some(node) => node,
            None => {
                warn!(pattern = %pattern.id, node_type = %node_type, "pattern node type not in catalogue");
                let fallback = &catalog.fallback().id;
                match instantiate_node(catalog, fallback, index) {
                    Some(node) => node,
                    None => NodeInstance::new((index + 1).to_string(), "Set", fallback.clone(), index),
                }
            }
        };

        let count = used.entry(node.name.clone()).or_insert(0);
        *count += 1;
        if *count > 1 {
            node.name = format!("{} {}", node.name, count);
        }
        document.push_node(node);
    }

    for rule in &pattern.connections {
        let (Some(from), Some(to)) = (document.nodes.get(rule.from), document.nodes.get(rule.to))
        else {
            warn!(pattern = %pattern.id, from = rule.from, to = rule.to, "connection rule out of range");
            continue;
        };
        let channel = rule.output.as_deref().unwrap_or(MAIN_CHANNEL);
        let output_index = catalog
            .get(&from.node_type)
            .and_then(|descriptor| descriptor.output_index(channel))
            .unwrap_or(0);
        let (from, to) = (from.name.clone(), to.name.clone());
        document.connect(&from, output_index, &to);
    }

    document
}

/// A name describing the document's shape: the first node followed by the
/// nodes nothing flows out of (`Webhook to Slack`, `Webhook to Slack and
/// Gmail`).
pub fn shape_name(document: &WorkflowDocument) -> Option<String> {
    let first = document.nodes.first()?;
    let ends: Vec<&str> = document
        .nodes
        .iter()
        .skip(1)
        .filter(|n| document.targets_of(&n.name).is_empty())
        .map(|n| n.name.as_str())
        .collect();
    if ends.is_empty() {
        return Some(first.name.clone());
    }
    Some(format!("{} to {}", first.name, ends.join(" and ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate;
    use flowsmith_catalog::PatternSet;
    use flowsmith_catalog::patterns::{CONDITIONAL_NOTIFICATION, SCHEDULED_DATA_SYNC};
    use serde_json::json;

    #[test]
    fn conditional_pattern_uses_fallback_output() {
        let catalog = NodeCatalog::builtin();
        let patterns = PatternSet::builtin();
        let pattern = patterns.require(CONDITIONAL_NOTIFICATION).unwrap();

        let doc = render_pattern(pattern, &catalog, "Alerts");
        assert_eq!(doc.nodes.len(), 4);
        assert_eq!(doc.nodes[0].id, "1");
        assert_eq!(json!(doc.nodes[3].position), json!([700, 200]));

        let if_name = doc.nodes[1].name.clone();
        let main = &doc.connections[&if_name]["main"];
        assert_eq!(main[0][0]["node"], json!(doc.nodes[2].name));
        assert_eq!(main[1][0]["node"], json!(doc.nodes[3].name));
    }

    #[test]
    fn rendered_pattern_validates_cleanly() {
        let catalog = NodeCatalog::builtin();
        for pattern in PatternSet::builtin().iter() {
            let doc = render_pattern(pattern, &catalog, &pattern.description);
            let out = validate(&doc.to_value(), &catalog);
            assert!(out.corrections.is_empty(), "{}: {:?}", pattern.id, out.corrections);
            assert_eq!(out.document, doc);
        }
    }

    #[test]
    fn example_parameters_are_copied() {
        let catalog = NodeCatalog::builtin();
        let patterns = PatternSet::builtin();
        let doc = render_pattern(patterns.require(SCHEDULED_DATA_SYNC).unwrap(), &catalog, "Sync");
        let http = doc
            .nodes
            .iter()
            .find(|n| n.node_type == "n8n-nodes-base.httpRequest")
            .unwrap();
        assert!(!http.parameters.is_empty());
    }

    #[test]
    fn shape_name_lists_first_and_final_nodes() {
        let catalog = NodeCatalog::builtin();
        let patterns = PatternSet::builtin();

        let conditional = render_pattern(patterns.require(CONDITIONAL_NOTIFICATION).unwrap(), &catalog, "x");
        assert_eq!(shape_name(&conditional).as_deref(), Some("Webhook to Slack and Gmail"));

        let mut single = WorkflowDocument::new("x");
        single.push_node(NodeInstance::new("1", "Webhook", "n8n-nodes-base.webhook", 0));
        assert_eq!(shape_name(&single).as_deref(), Some("Webhook"));
        assert!(shape_name(&WorkflowDocument::new("x")).is_none());
    }

    #[test]
    fn repeated_types_get_unique_names() {
        let catalog = NodeCatalog::builtin();
        let pattern = WorkflowPattern {
            id: "double".into(),
            description: "two sets".into(),
            nodes: vec!["n8n-nodes-base.set".into(), "n8n-nodes-base.set".into()],
            connections: vec![],
            use_case: String::new(),
        };
        let doc = render_pattern(&pattern, &catalog, "x");
        assert_ne!(doc.nodes[0].name, doc.nodes[1].name);
    }
}
