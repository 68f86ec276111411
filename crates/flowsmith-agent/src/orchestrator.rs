//! End-to-end workflow creation.
//!
//! [`Orchestrator::create_from_description`] runs one pipeline, strictly in
//! order:
//!
//! 1. pattern suggestion (advisory context for the generator)
//! 2. generation
//! 3. validation and normalization
//! 4. creation on the workflow server
//! 5. activation, when requested (failure here is recorded, not fatal)
//! 6. persistence of the [`CreationReport`], when a store is configured
//!
//! A failing stage ends the run with a [`PipelineFailure`].  Nothing is
//! rolled back: a workflow created before a persistence failure stays on the
//! server.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};
use uuid::Uuid;

use flowsmith_adapters::WorkflowRemote;
use flowsmith_catalog::{NodeCatalog, PatternMatcher};
use flowsmith_workflow::{Correction, WorkflowDocument, validate};

use crate::error::{AgentError, ErrorKind};
use crate::generator::{Complexity, GenerationRequest, WorkflowGenerator};
use crate::store::ResultStore;

/// Maximum length, in characters, of the generator transcript kept in a report.
pub const TRANSCRIPT_EXCERPT_CHARS: usize = 500;

// ---------------------------------------------------------------------------
// Stages and outcomes
// ---------------------------------------------------------------------------

/// Pipeline stage, as reported on failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Generation,
    Creation,
    Activation,
    Persistence,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Generation => write!(f, "generation"),
            Self::Creation => write!(f, "creation"),
            Self::Activation => write!(f, "activation"),
            Self::Persistence => write!(f, "persistence"),
        }
    }
}

/// Options for a single run.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateOptions {
    pub complexity: Complexity,
    pub auto_activate: bool,
}

/// The created workflow as seen by the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedSummary {
    pub id: String,
    pub name: String,
    pub url: String,
    pub nodes_count: usize,
    pub connections_count: usize,
    pub active: bool,
}

/// Result of the activation stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActivationOutcome {
    Activated { response: Value },
    Failed { kind: ErrorKind, message: String },
}

/// Record of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct CreationReport {
    pub run_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub description: String,
    pub complexity: Complexity,
    /// Which generator produced the document (`llm`, `template`).
    pub generator: &'static str,
    /// Id of the advisory pattern, if one matched.
    pub pattern: Option<String>,
    pub workflow: CreatedSummary,
    /// The validated document that was sent to the server.
    pub generated: WorkflowDocument,
    pub corrections: Vec<Correction>,
    pub transcript_excerpt: String,
    pub server_response: Value,
    pub activation: Option<ActivationOutcome>,
    /// Where the report was written, if it was.
    #[serde(skip)]
    pub saved_to: Option<PathBuf>,
}

/// A run that stopped at `stage`.
#[derive(Debug, thiserror::Error)]
#[error("{stage} failed ({kind}): {message}")]
pub struct PipelineFailure {
    pub stage: Stage,
    pub kind: ErrorKind,
    pub message: String,
    /// The validated document, when the run got that far.
    pub generated: Option<WorkflowDocument>,
}

impl PipelineFailure {
    fn new(stage: Stage, err: &AgentError, generated: Option<WorkflowDocument>) -> Self {
        Self {
            stage,
            kind: err.kind(),
            message: err.to_string(),
            generated,
        }
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Runs description → generation → validation → creation → activation →
/// persistence.
pub struct Orchestrator {
    catalog: Arc<NodeCatalog>,
    matcher: PatternMatcher,
    generator: Arc<dyn WorkflowGenerator>,
    remote: Arc<dyn WorkflowRemote>,
    store: Option<ResultStore>,
}

impl Orchestrator {
    pub fn new(
        catalog: Arc<NodeCatalog>,
        generator: Arc<dyn WorkflowGenerator>,
        remote: Arc<dyn WorkflowRemote>,
    ) -> Self {
        Self {
            catalog,
            matcher: PatternMatcher::builtin(),
            generator,
            remote,
            store: None,
        }
    }

    /// Persist reports of successful runs into `store`.
    pub fn with_store(mut self, store: ResultStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_matcher(mut self, matcher: PatternMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn catalog(&self) -> &NodeCatalog {
        &self.catalog
    }

    /// Run the whole pipeline for `description`.
    pub async fn create_from_description(
        &self,
        description: &str,
        options: CreateOptions,
    ) -> Result<CreationReport, PipelineFailure> {
        let run_id = Uuid::now_v7();
        info!(
            run_id = %run_id,
            generator = self.generator.name(),
            complexity = options.complexity.as_str(),
            "workflow creation started"
        );

        // 1. Advisory pattern.
        let pattern = self.matcher.suggest(description);
        if let Some(pattern) = pattern {
            info!(pattern = %pattern.id, "pattern suggested");
        }

        // 2. Generation.
        let request = GenerationRequest {
            description,
            complexity: options.complexity,
            pattern,
        };
        let generation = self.generator.generate(&request).await.map_err(|e| {
            error!(run_id = %run_id, error = %e, "generation failed");
            PipelineFailure::new(Stage::Generation, &e, None)
        })?;

        // 3. Validation.
        let validated = validate(&generation.raw, &self.catalog);
        for correction in &validated.corrections {
            warn!(run_id = %run_id, correction = %correction, "generated workflow corrected");
        }
        let document = validated.document;
        let corrections = validated.corrections;

        // 4. Creation.
        let created = match self.remote.create_workflow(&document).await {
            Ok(created) => created,
            Err(e) => {
                let e = AgentError::from(e);
                error!(run_id = %run_id, error = %e, "workflow creation failed");
                return Err(PipelineFailure::new(Stage::Creation, &e, Some(document)));
            }
        };
        info!(run_id = %run_id, workflow_id = %created.id, url = %created.url, "workflow created");

        // 5. Activation.
        let activation = if options.auto_activate {
            Some(match self.remote.activate_workflow(&created.id).await {
                Ok(response) => {
                    info!(workflow_id = %created.id, "workflow activated");
                    ActivationOutcome::Activated { response }
                }
                Err(e) => {
                    let e = AgentError::from(e);
                    warn!(workflow_id = %created.id, error = %e, "activation failed, workflow left inactive");
                    ActivationOutcome::Failed {
                        kind: e.kind(),
                        message: e.to_string(),
                    }
                }
            })
        } else {
            None
        };
        let active = matches!(activation, Some(ActivationOutcome::Activated { .. }));

        let workflow = CreatedSummary {
            id: created.id.clone(),
            name: created.name.clone().unwrap_or_else(|| document.name.clone()),
            url: created.url.clone(),
            nodes_count: document.nodes.len(),
            connections_count: document.connection_count(),
            active,
        };

        let mut report = CreationReport {
            run_id,
            timestamp: Utc::now(),
            description: description.to_owned(),
            complexity: options.complexity,
            generator: self.generator.name(),
            pattern: pattern.map(|p| p.id.clone()),
            workflow,
            generated: document,
            corrections,
            transcript_excerpt: excerpt(&generation.transcript, TRANSCRIPT_EXCERPT_CHARS),
            server_response: created.response,
            activation,
            saved_to: None,
        };

        // 6. Persistence.
        if let Some(store) = &self.store {
            match store.save(&report).await {
                Ok(path) => report.saved_to = Some(path),
                Err(e) => {
                    error!(run_id = %run_id, error = %e, "saving creation report failed");
                    return Err(PipelineFailure::new(
                        Stage::Persistence,
                        &e,
                        Some(report.generated),
                    ));
                }
            }
        }

        info!(
            run_id = %run_id,
            workflow_id = %report.workflow.id,
            nodes = report.workflow.nodes_count,
            connections = report.workflow.connections_count,
            active = report.workflow.active,
            "workflow creation finished"
        );
        Ok(report)
    }
}

/// At most `max` characters of `text`; longer text is cut and ends in `...`.
fn excerpt(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_owned();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}
