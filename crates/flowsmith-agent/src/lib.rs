//! Workflow generation pipeline for Flowsmith.
//!
//! - [`llm`]: HTTP client for Anthropic and OpenAI-compatible chat APIs.
//! - [`prompt`] and [`extract`]: prompt composition and JSON extraction.
//! - [`generator`]: the [`WorkflowGenerator`] seam with LLM and template
//!   implementations.
//! - [`orchestrator`]: the end-to-end creation pipeline.
//! - [`store`]: on-disk creation reports.

pub mod error;
pub mod extract;
pub mod generator;
pub mod llm;
pub mod orchestrator;
pub mod prompt;
pub mod store;

pub use error::{AgentError, ErrorKind, Result};
pub use extract::extract_json_object;
pub use generator::{
    Complexity, Generation, GenerationRequest, LlmGenerator, TemplateGenerator, WorkflowGenerator,
};
pub use llm::{LlmClient, LlmClientConfig, LlmProvider};
pub use orchestrator::{
    ActivationOutcome, CreateOptions, CreatedSummary, CreationReport, Orchestrator,
    PipelineFailure, Stage,
};
pub use store::ResultStore;
