//! n8n REST API adapter.
//!
//! Two mutually exclusive auth schemes are supported: the public API with an
//! `X-N8N-API-KEY` header (`/api/v1/...`) and an email/password cookie
//! session on the internal REST API (`/rest/...`).

pub mod auth;
pub mod client;
pub mod diagnostics;
pub mod lazy;
pub mod types;

pub use auth::{AuthScheme, N8nCredentials};
pub use client::N8nClient;
pub use diagnostics::{CheckResult, CheckStatus, ConnectionReport};
pub use lazy::LazyN8nClient;
pub use types::{CreatedWorkflow, WorkflowSummary};
