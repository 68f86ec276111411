//! An n8n remote that connects on first use.
//!
//! Building the client and authenticating are deferred until the first
//! remote operation, so a creation run can generate and validate its
//! document before the server is contacted.  A failed attempt is not
//! cached; the next operation tries again.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::debug;

use flowsmith_workflow::WorkflowDocument;

use super::auth::N8nCredentials;
use super::client::N8nClient;
use super::types::CreatedWorkflow;
use crate::error::Result;
use crate::traits::WorkflowRemote;

pub struct LazyN8nClient {
    base_url: String,
    timeout: Option<Duration>,
    credentials: N8nCredentials,
    client: OnceCell<N8nClient>,
}

impl LazyN8nClient {
    pub fn new(base_url: &str, timeout: Option<Duration>, credentials: N8nCredentials) -> Self {
        Self {
            base_url: base_url.to_owned(),
            timeout,
            credentials,
            client: OnceCell::new(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.client.initialized()
    }

    /// The authenticated client, connecting first if needed.
    pub async fn client(&self) -> Result<&N8nClient> {
        self.client
            .get_or_try_init(|| async {
                debug!(base_url = %self.base_url, "connecting to n8n");
                let mut client = N8nClient::with_timeout(&self.base_url, self.timeout)?;
                client.authenticate(&self.credentials).await?;
                Ok(client)
            })
            .await
    }
}

#[async_trait]
impl WorkflowRemote for LazyN8nClient {
    async fn create_workflow(&self, document: &WorkflowDocument) -> Result<CreatedWorkflow> {
        self.client().await?.create_workflow(document).await
    }

    async fn activate_workflow(&self, workflow_id: &str) -> Result<Value> {
        self.client().await?.activate_workflow(workflow_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteError;

    #[tokio::test]
    async fn nothing_happens_until_first_use() {
        let remote = LazyN8nClient::new("http://127.0.0.1:9", None, N8nCredentials::default());
        assert!(!remote.is_connected());

        let err = remote
            .create_workflow(&WorkflowDocument::new("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::MissingCredentials));
        assert!(!remote.is_connected());
    }

    #[tokio::test]
    async fn bad_base_url_surfaces_on_first_operation() {
        let remote = LazyN8nClient::new("not a url", None, N8nCredentials::api_key("k"));
        assert!(matches!(
            remote.activate_workflow("1").await,
            Err(RemoteError::InvalidBaseUrl { .. })
        ));
    }
}
