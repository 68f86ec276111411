//! Seams between the orchestrator and remote services.

use async_trait::async_trait;
use serde_json::Value;

use flowsmith_workflow::WorkflowDocument;

use crate::error::Result;
use crate::n8n::CreatedWorkflow;

/// The remote operations a workflow creation run needs.
///
/// Implemented by [`N8nClient`](crate::n8n::N8nClient); tests substitute
/// in-memory fakes.
#[async_trait]
pub trait WorkflowRemote: Send + Sync {
    /// Store a new workflow on the server.
    async fn create_workflow(&self, document: &WorkflowDocument) -> Result<CreatedWorkflow>;

    /// Switch a stored workflow to active.
    async fn activate_workflow(&self, workflow_id: &str) -> Result<Value>;
}
