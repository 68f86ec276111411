//! Prompt composition for LLM-driven workflow generation.

use std::fmt::Write;

use flowsmith_catalog::{NodeCatalog, RequiredCategory, WorkflowPattern};

use crate::generator::Complexity;

/// Number of catalogue entries listed in the prompt.
pub const CATALOG_EXCERPT_LEN: usize = 10;

/// System instructions sent with every generation request.
pub const SYSTEM_PROMPT: &str = "You are an expert in n8n, the workflow automation platform. \
You design working n8n workflows from business process descriptions and answer with a single \
n8n workflow JSON document in a ```json fenced block.";

const STRUCTURE_EXAMPLE: &str = r#"{
  "name": "Workflow name",
  "active": false,
  "nodes": [
    {
      "id": "1",
      "name": "Node Name",
      "type": "n8n-nodes-base.nodetype",
      "typeVersion": 1,
      "position": [100, 200],
      "parameters": {}
    }
  ],
  "connections": {
    "Node Name": {
      "main": [[{"node": "Next Node Name", "type": "main", "index": 0}]]
    }
  },
  "settings": {},
  "staticData": {}
}"#;

/// Everything the prompt is composed from.
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub description: &'a str,
    pub complexity: Complexity,
    pub categories: &'a [RequiredCategory],
    /// Advisory pattern suggested by the matcher.
    pub pattern: Option<&'a WorkflowPattern>,
    pub catalog: &'a NodeCatalog,
}

/// Compose the user prompt for a generation request.
pub fn build_prompt(ctx: &PromptContext<'_>) -> String {
    let mut prompt = String::with_capacity(2048);

    let _ = writeln!(prompt, "Create a WORKING n8n workflow for the process below.\n");
    let _ = writeln!(prompt, "PROCESS DESCRIPTION:\n{}\n", ctx.description.trim());

    let _ = writeln!(prompt, "CONTEXT:");
    let _ = writeln!(prompt, "- Complexity: {}", ctx.complexity.as_str());
    let categories: Vec<&str> = ctx.categories.iter().map(|c| c.as_str()).collect();
    let _ = writeln!(
        prompt,
        "- Required node categories: {}",
        if categories.is_empty() {
            "none detected".to_owned()
        } else {
            categories.join(", ")
        }
    );
    if let Some(pattern) = ctx.pattern {
        let _ = writeln!(prompt, "- Suggested pattern: {}", pattern.description);
        let _ = writeln!(prompt, "  Nodes: {}", pattern.nodes.join(" -> "));
        let edges: Vec<String> = pattern
            .connections
            .iter()
            .map(|rule| match &rule.output {
                Some(channel) => format!("{} -[{channel}]-> {}", rule.from, rule.to),
                None => format!("{} -> {}", rule.from, rule.to),
            })
            .collect();
        let _ = writeln!(prompt, "  Connections (by node index): {}", edges.join(", "));
    }

    let _ = writeln!(prompt, "\nAVAILABLE N8N NODES (use ONLY these):");
    for node in ctx.catalog.iter().take(CATALOG_EXCERPT_LEN) {
        let _ = writeln!(
            prompt,
            "- {}: {} - {}",
            node.id, node.display_name, node.description
        );
    }

    let _ = writeln!(
        prompt,
        "\nREQUIREMENTS:\n\
         1. Use only real n8n node types from the list above.\n\
         2. Produce a valid n8n workflow JSON structure.\n\
         3. Connect the nodes correctly; connections reference node names, not ids.\n\
         4. Give every node realistic parameters.\n\
         5. Give every node a unique id and a position laid out left to right.\n"
    );
    let _ = writeln!(prompt, "WORKFLOW STRUCTURE:\n```json\n{STRUCTURE_EXAMPLE}\n```");

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowsmith_catalog::{PatternMatcher, required_categories};

    #[test]
    fn prompt_carries_context() {
        let catalog = NodeCatalog::builtin();
        let matcher = PatternMatcher::builtin();
        let description = "Каждый час получать данные из API и сохранять в Google Sheets";
        let categories = required_categories(description);
        let prompt = build_prompt(&PromptContext {
            description,
            complexity: Complexity::Medium,
            categories: &categories,
            pattern: matcher.suggest(description),
            catalog: &catalog,
        });

        assert!(prompt.contains(description));
        assert!(prompt.contains("Complexity: medium"));
        assert!(prompt.contains("schedule"));
        assert!(prompt.contains("Periodic data synchronization"));
        assert!(prompt.contains("n8n-nodes-base.webhook"));
    }

    #[test]
    fn catalogue_excerpt_is_limited() {
        let catalog = NodeCatalog::builtin();
        assert!(catalog.len() > CATALOG_EXCERPT_LEN);
        let prompt = build_prompt(&PromptContext {
            description: "anything at all",
            complexity: Complexity::Simple,
            categories: &[],
            pattern: None,
            catalog: &catalog,
        });
        let listed = prompt
            .lines()
            .filter(|line| line.starts_with("- n8n-nodes-base."))
            .count();
        assert_eq!(listed, CATALOG_EXCERPT_LEN);
        assert!(prompt.contains("none detected"));
        assert!(!prompt.contains("Suggested pattern"));
    }
}
