//! n8n REST API client.
//!
//! Every operation is a single sequential HTTP exchange (activation is two).
//! Only HTTP 200 and 201 count as success; any other status becomes
//! [`RemoteError::Status`] carrying the response body verbatim.  There are
//! no retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde_json::{Value, json};
use tracing::{debug, info, warn};
use url::Url;

use flowsmith_workflow::WorkflowDocument;

use super::auth::{API_KEY_HEADER, AuthScheme, N8nCredentials, PUBLIC_API_PREFIX, REST_PREFIX};
use super::diagnostics::ConnectionReport;
use super::types::{
    CreatedWorkflow, WorkflowSummary, listing_entries, unwrap_data, value_id,
};
use crate::error::{RemoteError, Result};
use crate::traits::WorkflowRemote;

const USER_AGENT: &str = concat!("flowsmith/", env!("CARGO_PKG_VERSION"));

/// Client for one n8n server.
///
/// Starts unauthenticated; [`authenticate`](Self::authenticate),
/// [`authenticate_with_api_key`](Self::authenticate_with_api_key) or
/// [`login`](Self::login) select the auth scheme.
pub struct N8nClient {
    /// Base URL without trailing slash.
    base_url: String,
    http: reqwest::Client,
    auth: Option<AuthScheme>,
}

impl N8nClient {
    /// Create a client using the transport's default request timeout.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, None)
    }

    /// Create a client with an explicit per-request timeout.
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let parsed = Url::parse(base_url).map_err(|e| RemoteError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(RemoteError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: format!("unsupported scheme `{}`", parsed.scheme()),
            });
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .cookie_store(true);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| RemoteError::Transport {
            operation: "build_client",
            reason: e.to_string(),
        })?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            http,
            auth: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth_scheme(&self) -> Option<&AuthScheme> {
        self.auth.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_some()
    }

    /// Editor URL of a workflow.
    pub fn workflow_url(&self, workflow_id: &str) -> String {
        format!("{}/workflow/{workflow_id}", self.base_url)
    }

    // -----------------------------------------------------------------------
    // HTTP helpers
    // -----------------------------------------------------------------------

    /// Request to an absolute path under the base URL, carrying the API key
    /// header when that scheme is active.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self.http.request(method, format!("{}{path}", self.base_url));
        match &self.auth {
            Some(AuthScheme::ApiKey { key }) => request.header(API_KEY_HEADER, key),
            _ => request,
        }
    }

    /// Request to a workflow endpoint under the active scheme's prefix.
    /// Fails without touching the network when unauthenticated.
    fn authorized(&self, method: Method, path: &str, operation: &'static str) -> Result<RequestBuilder> {
        let auth = self
            .auth
            .as_ref()
            .ok_or(RemoteError::NotAuthenticated { operation })?;
        Ok(self.request(method, &format!("{}{path}", auth.prefix())))
    }

    /// Send a request and return the body of a 200/201 response.
    async fn send(&self, request: RequestBuilder, operation: &'static str) -> Result<String> {
        let response = request.send().await.map_err(|e| RemoteError::Transport {
            operation,
            reason: e.to_string(),
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| RemoteError::Transport {
            operation,
            reason: format!("failed to read response body: {e}"),
        })?;

        if !matches!(status, 200 | 201) {
            warn!(operation, status, "n8n request failed");
            return Err(RemoteError::Status {
                operation,
                status,
                body,
            });
        }
        debug!(operation, status, bytes = body.len(), "n8n request succeeded");
        Ok(body)
    }

    /// Like [`send`](Self::send), parsing the body as JSON.  An empty body
    /// yields `null`.
    async fn send_json(&self, request: RequestBuilder, operation: &'static str) -> Result<Value> {
        let body = self.send(request, operation).await?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| RemoteError::UnexpectedResponse {
            operation,
            reason: format!("response is not JSON: {e}"),
        })
    }

    // -----------------------------------------------------------------------
    // Authentication
    // -----------------------------------------------------------------------

    /// Authenticate with whichever credentials are usable, preferring the API
    /// key.
    pub async fn authenticate(&mut self, credentials: &N8nCredentials) -> Result<()> {
        if let Some(key) = credentials.usable_api_key() {
            return self.authenticate_with_api_key(key).await;
        }
        if let Some((email, password)) = credentials.usable_login() {
            return self.login(email, password).await;
        }
        Err(RemoteError::MissingCredentials)
    }

    /// Probe the public API with `api_key`; on success all later requests
    /// use it.
    pub async fn authenticate_with_api_key(&mut self, api_key: &str) -> Result<()> {
        let request = self
            .http
            .get(format!("{}{PUBLIC_API_PREFIX}/workflows", self.base_url))
            .header(API_KEY_HEADER, api_key);
        self.send(request, "authenticate_with_api_key").await?;

        self.auth = Some(AuthScheme::ApiKey {
            key: api_key.to_owned(),
        });
        info!(base_url = %self.base_url, "authenticated with API key");
        Ok(())
    }

    /// Open a cookie session with email and password.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<()> {
        let request = self
            .http
            .post(format!("{}{REST_PREFIX}/login", self.base_url))
            .json(&json!({ "email": email, "password": password }));
        self.send(request, "login").await?;

        self.auth = Some(AuthScheme::Session {
            email: email.to_owned(),
        });
        info!(base_url = %self.base_url, email, "session login succeeded");
        Ok(())
    }

    /// Confirm the current credentials are still accepted.
    pub async fn check_authentication(&self) -> Result<()> {
        let operation = "check_authentication";
        let request = self.authorized(Method::GET, "/workflows", operation)?;
        self.send(request, operation).await.map(|_| ())
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// `GET /healthz`, no authentication.
    pub async fn health_check(&self) -> Result<()> {
        let request = self.http.get(format!("{}/healthz", self.base_url));
        self.send(request, "health_check").await.map(|_| ())
    }

    pub async fn list_workflows(&self) -> Result<Vec<WorkflowSummary>> {
        let operation = "list_workflows";
        let request = self.authorized(Method::GET, "/workflows", operation)?;
        let body = self.send_json(request, operation).await?;
        Ok(listing_entries(body)
            .iter()
            .filter_map(WorkflowSummary::from_value)
            .collect())
    }

    pub async fn get_workflow(&self, workflow_id: &str) -> Result<Value> {
        let operation = "get_workflow";
        let request = self.authorized(Method::GET, &format!("/workflows/{workflow_id}"), operation)?;
        self.send_json(request, operation).await.map(unwrap_data)
    }

    /// Create a workflow from a validated document.
    pub async fn create_workflow(&self, document: &WorkflowDocument) -> Result<CreatedWorkflow> {
        let operation = "create_workflow";
        let request = self
            .authorized(Method::POST, "/workflows", operation)?
            .json(document);
        let response = unwrap_data(self.send_json(request, operation).await?);

        let id = value_id(&response).ok_or_else(|| RemoteError::UnexpectedResponse {
            operation,
            reason: "response carries no workflow id".into(),
        })?;
        let name = response.get("name").and_then(Value::as_str).map(str::to_owned);
        info!(workflow_id = %id, name = ?name, "workflow created");

        Ok(CreatedWorkflow {
            url: self.workflow_url(&id),
            id,
            name,
            response,
        })
    }

    pub async fn update_workflow(&self, workflow_id: &str, workflow: &Value) -> Result<Value> {
        let operation = "update_workflow";
        let request = self
            .authorized(Method::PUT, &format!("/workflows/{workflow_id}"), operation)?
            .json(workflow);
        self.send_json(request, operation).await.map(unwrap_data)
    }

    /// Fetch the workflow, set `active = true` and store it back.
    pub async fn activate_workflow(&self, workflow_id: &str) -> Result<Value> {
        let mut workflow = self.get_workflow(workflow_id).await?;
        let Some(fields) = workflow.as_object_mut() else {
            return Err(RemoteError::UnexpectedResponse {
                operation: "activate_workflow",
                reason: "workflow payload is not an object".into(),
            });
        };
        fields.insert("active".into(), Value::Bool(true));

        let updated = self.update_workflow(workflow_id, &workflow).await?;
        info!(workflow_id, "workflow activated");
        Ok(updated)
    }

    /// Run a workflow, optionally passing input data.
    pub async fn execute_workflow(&self, workflow_id: &str, data: Option<Value>) -> Result<Value> {
        let operation = "execute_workflow";
        let payload = match data {
            Some(data) => json!({ "data": data }),
            None => json!({}),
        };
        let request = self
            .authorized(Method::POST, &format!("/workflows/{workflow_id}/execute"), operation)?
            .json(&payload);
        let execution = self.send_json(request, operation).await?;
        info!(workflow_id, "workflow executed");
        Ok(execution)
    }

    /// Node types installed on the server.  Usually readable without
    /// authentication.
    pub async fn list_node_types(&self) -> Result<Value> {
        let request = self.request(Method::GET, &format!("{REST_PREFIX}/node-types"));
        self.send_json(request, "list_node_types").await
    }

    /// Run health, authentication, listing and node-type checks and collect
    /// the outcomes.  Never fails; failures are recorded in the report.
    pub async fn test_connection(&self) -> ConnectionReport {
        let mut report =
            ConnectionReport::new(&self.base_url, self.auth.as_ref().map(AuthScheme::name));

        report.record(
            "basic_connection",
            self.health_check().await.map(|()| "server is reachable".to_owned()),
        );
        report.record(
            "authentication",
            self.check_authentication()
                .await
                .map(|()| "credentials accepted".to_owned()),
        );
        if self.is_authenticated() {
            report.record(
                "workflows_access",
                self.list_workflows()
                    .await
                    .map(|w| format!("{} workflows visible", w.len())),
            );
        } else {
            report.skip("workflows_access", "not authenticated");
        }
        report.record(
            "node_types_access",
            self.list_node_types()
                .await
                .map(|types| format!("{} node types available", listing_entries(types).len())),
        );

        debug!(healthy = report.is_healthy(), "connection test finished");
        report
    }
}

#[async_trait]
impl WorkflowRemote for N8nClient {
    async fn create_workflow(&self, document: &WorkflowDocument) -> Result<CreatedWorkflow> {
        N8nClient::create_workflow(self, document).await
    }

    async fn activate_workflow(&self, workflow_id: &str) -> Result<Value> {
        N8nClient::activate_workflow(self, workflow_id).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
