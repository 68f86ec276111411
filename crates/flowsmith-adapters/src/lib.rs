//! Remote service adapters for Flowsmith.
//!
//! Currently a single adapter: the n8n REST API client in [`n8n`], exposed to
//! the orchestrator through the [`WorkflowRemote`] trait.

pub mod error;
pub mod n8n;
pub mod traits;

pub use error::{RemoteError, Result};
pub use n8n::{
    AuthScheme, CheckStatus, ConnectionReport, CreatedWorkflow, LazyN8nClient, N8nClient,
    N8nCredentials, WorkflowSummary,
};
pub use traits::WorkflowRemote;
