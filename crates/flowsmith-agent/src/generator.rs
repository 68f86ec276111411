//! Workflow generators.
//!
//! A generator turns a description into a raw (unvalidated) workflow JSON
//! value.  [`LlmGenerator`] asks a language model; [`TemplateGenerator`]
//! renders a built-in pattern and needs no network access.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use flowsmith_catalog::patterns::WEBHOOK_TO_ACTION;
use flowsmith_catalog::{
    ConnectionRule, NodeCatalog, PatternSet, RequiredCategory, WorkflowPattern,
    required_categories,
};
use flowsmith_workflow::{render_pattern, shape_name};

use crate::error::{AgentError, Result};
use crate::extract::extract_json_object;
use crate::llm::{ChatRequest, LlmClient, Message};
use crate::prompt::{PromptContext, SYSTEM_PROMPT, build_prompt};

// ---------------------------------------------------------------------------
// Request / output
// ---------------------------------------------------------------------------

/// Requested sophistication of the generated workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    #[default]
    Medium,
    Complex,
}

impl Complexity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Medium => "medium",
            Self::Complex => "complex",
        }
    }
}

impl std::str::FromStr for Complexity {
    type Err = AgentError;

    /// Accepts the English names and the Russian labels
    /// (`простая`, `средняя`, `сложная`).
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "simple" | "простая" => Ok(Self::Simple),
            "medium" | "средняя" => Ok(Self::Medium),
            "complex" | "сложная" => Ok(Self::Complex),
            other => Err(AgentError::Config {
                reason: format!("unknown complexity `{other}`"),
            }),
        }
    }
}

/// Input to a generator.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub description: &'a str,
    pub complexity: Complexity,
    /// Advisory pattern from the matcher, if any.
    pub pattern: Option<&'a WorkflowPattern>,
}

/// Output of a generator.
#[derive(Debug, Clone)]
pub struct Generation {
    /// Raw workflow JSON, not yet validated.
    pub raw: Value,
    /// What the generator produced verbatim (model text, or a short note).
    pub transcript: String,
}

/// Something that turns a description into raw workflow JSON.
#[async_trait]
pub trait WorkflowGenerator: Send + Sync {
    /// Short identifier recorded in results (`llm`, `template`).
    fn name(&self) -> &'static str;

    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<Generation>;
}

// ---------------------------------------------------------------------------
// LLM generator
// ---------------------------------------------------------------------------

/// Generator backed by a single LLM chat call.
pub struct LlmGenerator {
    client: LlmClient,
    catalog: Arc<NodeCatalog>,
    temperature: Option<f32>,
}

impl LlmGenerator {
    pub fn new(client: LlmClient, catalog: Arc<NodeCatalog>) -> Self {
        Self {
            client,
            catalog,
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// The chat request sent for `request`.
    pub fn chat_request(&self, request: &GenerationRequest<'_>) -> ChatRequest {
        let categories = required_categories(request.description);
        let prompt = build_prompt(&PromptContext {
            description: request.description,
            complexity: request.complexity,
            categories: &categories,
            pattern: request.pattern,
            catalog: &self.catalog,
        });
        let mut chat = ChatRequest::new(vec![Message::system(SYSTEM_PROMPT), Message::user(prompt)]);
        chat.temperature = self.temperature;
        chat
    }
}

#[async_trait]
impl WorkflowGenerator for LlmGenerator {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<Generation> {
        let chat = self.chat_request(request);
        info!(
            provider = self.client.provider().as_str(),
            model = %self.client.default_model(),
            "requesting workflow from LLM"
        );
        let response = self.client.chat(&chat).await?;
        let raw = extract_json_object(&response.text)?;
        debug!(chars = response.text.len(), "workflow JSON extracted from LLM output");
        Ok(Generation {
            raw,
            transcript: response.text,
        })
    }
}

// ---------------------------------------------------------------------------
// Template generator
// ---------------------------------------------------------------------------

const SLACK_NODE_TYPE: &str = "n8n-nodes-base.slack";
const SHEETS_NODE_TYPE: &str = "n8n-nodes-base.googleSheets";
const GMAIL_NODE_TYPE: &str = "n8n-nodes-base.gmail";

/// Words selecting Gmail rather than Google Sheets as the Google destination.
const MAIL_KEYWORDS: &[&str] = &["gmail", "email", "почт", "письм"];

/// Destination node types named by `description`, in a fixed order.
fn destination_types(description: &str) -> Vec<&'static str> {
    let lower = description.to_lowercase();
    let mut types = Vec::new();
    for category in required_categories(description) {
        match category {
            RequiredCategory::Google if MAIL_KEYWORDS.iter().any(|k| lower.contains(k)) => {
                types.push(GMAIL_NODE_TYPE)
            }
            RequiredCategory::Google => types.push(SHEETS_NODE_TYPE),
            RequiredCategory::Communication => types.push(SLACK_NODE_TYPE),
            _ => {}
        }
    }
    types
}

/// `pattern` with every destination it lacks appended after its last node.
///
/// Branching patterns (rules on a non-default channel) are returned as-is.
fn with_destinations(pattern: &WorkflowPattern, destinations: &[&str]) -> WorkflowPattern {
    let mut fitted = pattern.clone();
    if pattern.connections.iter().any(|r| r.output.is_some()) {
        return fitted;
    }
    let Some(last) = pattern.nodes.len().checked_sub(1) else {
        return fitted;
    };
    for node_type in destinations {
        if fitted.nodes.iter().any(|n| n == node_type) {
            continue;
        }
        fitted.nodes.push((*node_type).to_owned());
        fitted.connections.push(ConnectionRule {
            from: last,
            to: fitted.nodes.len() - 1,
            output: None,
        });
    }
    fitted
}

/// Offline generator rendering the suggested pattern, or the plain webhook
/// pattern when none was suggested.  Slack, Google Sheets or Gmail
/// destinations named in the description are appended when the pattern
/// lacks them, and the document is named after the resulting shape.
pub struct TemplateGenerator {
    catalog: Arc<NodeCatalog>,
    patterns: PatternSet,
}

impl TemplateGenerator {
    pub fn new(catalog: Arc<NodeCatalog>) -> Self {
        Self {
            catalog,
            patterns: PatternSet::builtin(),
        }
    }
}

#[async_trait]
impl WorkflowGenerator for TemplateGenerator {
    fn name(&self) -> &'static str {
        "template"
    }

    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<Generation> {
        let pattern = match request.pattern {
            Some(pattern) => pattern,
            None => self.patterns.require(WEBHOOK_TO_ACTION).map_err(|e| AgentError::Config {
                reason: e.to_string(),
            })?,
        };

        let fitted = with_destinations(pattern, &destination_types(request.description));
        let mut document = render_pattern(&fitted, &self.catalog, &pattern.description);
        if let Some(name) = shape_name(&document) {
            document.name = name;
        }
        info!(
            pattern = %pattern.id,
            name = %document.name,
            nodes = document.nodes.len(),
            "workflow rendered from template"
        );

        Ok(Generation {
            raw: document.to_value(),
            transcript: format!("template `{}` rendered without an LLM", pattern.id),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
