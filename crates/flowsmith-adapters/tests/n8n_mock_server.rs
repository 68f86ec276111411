//! End-to-end tests for the n8n client.
//!
//! A small Axum server imitating the n8n endpoints is bound to an
//! OS-assigned port; the real client talks to it over HTTP.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{Json, Router};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use flowsmith_adapters::{
    CheckStatus, LazyN8nClient, N8nClient, N8nCredentials, RemoteError, WorkflowRemote,
};
use flowsmith_catalog::NodeCatalog;
use flowsmith_workflow::{WorkflowDocument, validate};

const API_KEY: &str = "test-key";
const SESSION_COOKIE: &str = "n8n-auth=session-1";

// ── mock server ──────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
struct MockN8n {
    /// `"METHOD /path"` for every request received.
    log: Arc<Mutex<Vec<String>>>,
    /// Last body received by `PUT /workflows/{id}`.
    updated: Arc<Mutex<Option<Value>>>,
    fail_create: bool,
}

impl MockN8n {
    fn hit(&self, line: String) {
        self.log.lock().unwrap().push(line);
    }

    fn requests(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

fn has_api_key(headers: &HeaderMap) -> bool {
    headers.get("x-n8n-api-key").and_then(|v| v.to_str().ok()) == Some(API_KEY)
}

fn has_session(headers: &HeaderMap) -> bool {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|c| c.contains(SESSION_COOKIE))
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"message": "unauthorized"}))).into_response()
}

async fn healthz(State(mock): State<MockN8n>) -> Json<Value> {
    mock.hit("GET /healthz".into());
    Json(json!({"status": "ok"}))
}

async fn public_list(State(mock): State<MockN8n>, headers: HeaderMap) -> Response {
    mock.hit("GET /api/v1/workflows".into());
    if !has_api_key(&headers) {
        return unauthorized();
    }
    Json(json!({
        "data": [
            {"id": "1", "name": "Existing", "active": false},
            {"id": 2, "name": "Legacy", "active": true}
        ],
        "nextCursor": null
    }))
    .into_response()
}

async fn public_create(
    State(mock): State<MockN8n>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    mock.hit("POST /api/v1/workflows".into());
    if !has_api_key(&headers) {
        return unauthorized();
    }
    if mock.fail_create {
        return (StatusCode::INTERNAL_SERVER_ERROR, "internal explosion").into_response();
    }
    let mut stored = body;
    stored["id"] = json!("wf-1");
    (StatusCode::OK, Json(stored)).into_response()
}

async fn public_get(
    State(mock): State<MockN8n>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    mock.hit(format!("GET /api/v1/workflows/{id}"));
    if !has_api_key(&headers) {
        return unauthorized();
    }
    if id != "wf-1" {
        return (StatusCode::NOT_FOUND, Json(json!({"message": "Not Found"}))).into_response();
    }
    Json(json!({"id": "wf-1", "name": "Orders", "active": false, "nodes": [], "connections": {}}))
        .into_response()
}

async fn public_update(
    State(mock): State<MockN8n>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    mock.hit(format!("PUT /api/v1/workflows/{id}"));
    if !has_api_key(&headers) {
        return unauthorized();
    }
    *mock.updated.lock().unwrap() = Some(body.clone());
    Json(body).into_response()
}

async fn public_execute(
    State(mock): State<MockN8n>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    mock.hit(format!("POST /api/v1/workflows/{id}/execute"));
    if !has_api_key(&headers) {
        return unauthorized();
    }
    Json(json!({"executionId": "exec-1", "input": body})).into_response()
}

async fn rest_login(State(mock): State<MockN8n>, Json(body): Json<Value>) -> Response {
    mock.hit("POST /rest/login".into());
    if body["email"] == "admin@example.com" && body["password"] == "pw" {
        (
            [(header::SET_COOKIE, format!("{SESSION_COOKIE}; Path=/"))],
            Json(json!({"data": {"email": "admin@example.com"}})),
        )
            .into_response()
    } else {
        unauthorized()
    }
}

async fn rest_list(State(mock): State<MockN8n>, headers: HeaderMap) -> Response {
    mock.hit("GET /rest/workflows".into());
    if !has_session(&headers) {
        return unauthorized();
    }
    Json(json!({"data": [{"id": "9", "name": "Session flow", "active": false}]})).into_response()
}

async fn rest_node_types(State(mock): State<MockN8n>) -> Json<Value> {
    mock.hit("GET /rest/node-types".into());
    Json(json!([{"name": "n8n-nodes-base.set"}, {"name": "n8n-nodes-base.webhook"}]))
}

/// Bind to 127.0.0.1:0, start the mock router, return (base_url, state).
async fn start_mock(fail_create: bool) -> (String, MockN8n) {
    let mock = MockN8n {
        fail_create,
        ..MockN8n::default()
    };
    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/api/v1/workflows", get(public_list).post(public_create))
        .route("/api/v1/workflows/{id}", get(public_get).put(public_update))
        .route("/api/v1/workflows/{id}/execute", post(public_execute))
        .route("/rest/login", post(rest_login))
        .route("/rest/workflows", get(rest_list))
        .route("/rest/node-types", get(rest_node_types))
        .with_state(mock.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind to port 0");
    let addr: SocketAddr = listener.local_addr().expect("get local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;

    (format!("http://127.0.0.1:{}", addr.port()), mock)
}

async fn api_key_client(base: &str) -> N8nClient {
    let mut client = N8nClient::new(base).unwrap();
    client.authenticate_with_api_key(API_KEY).await.unwrap();
    client
}

fn sample_document() -> WorkflowDocument {
    let raw = json!({
        "name": "Orders",
        "nodes": [
            {"name": "Webhook", "type": "n8n-nodes-base.webhook"},
            {"name": "Slack", "type": "n8n-nodes-base.slack"}
        ],
        "connections": {
            "Webhook": {"main": [[{"node": "Slack", "type": "main", "index": 0}]]}
        }
    });
    validate(&raw, &NodeCatalog::builtin()).document
}

// ── tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_check_needs_no_auth() {
    let (base, mock) = start_mock(false).await;
    let client = N8nClient::new(&base).unwrap();
    client.health_check().await.unwrap();
    assert_eq!(mock.requests(), vec!["GET /healthz"]);
}

#[tokio::test]
async fn api_key_check_and_listing() {
    let (base, _mock) = start_mock(false).await;
    let client = api_key_client(&base).await;
    assert_eq!(client.auth_scheme().map(|a| a.name()), Some("api_key"));

    client.check_authentication().await.unwrap();
    let workflows = client.list_workflows().await.unwrap();
    assert_eq!(workflows.len(), 2);
    assert_eq!(workflows[1].id, "2");
    assert!(workflows[1].active);
}

#[tokio::test]
async fn wrong_api_key_leaves_client_unauthenticated() {
    let (base, _mock) = start_mock(false).await;
    let mut client = N8nClient::new(&base).unwrap();
    let err = client.authenticate_with_api_key("wrong").await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn create_returns_id_and_editor_url() {
    let (base, mock) = start_mock(false).await;
    let client = api_key_client(&base).await;

    let created = client.create_workflow(&sample_document()).await.unwrap();
    assert_eq!(created.id, "wf-1");
    assert_eq!(created.name.as_deref(), Some("Orders"));
    assert_eq!(created.url, format!("{base}/workflow/wf-1"));
    assert_eq!(created.response["nodes"].as_array().unwrap().len(), 2);
    assert!(mock.requests().contains(&"POST /api/v1/workflows".to_string()));
}

#[tokio::test]
async fn server_error_body_is_surfaced_verbatim() {
    let (base, _mock) = start_mock(true).await;
    let client = api_key_client(&base).await;

    let err = client.create_workflow(&sample_document()).await.unwrap_err();
    match &err {
        RemoteError::Status { status, body, .. } => {
            assert_eq!(*status, 500);
            assert_eq!(body, "internal explosion");
        }
        other => panic!("expected status error, got {other:?}"),
    }
    let message = err.to_string();
    assert!(message.contains("500"));
    assert!(message.contains("internal explosion"));
}

#[tokio::test]
async fn activation_reads_then_writes_active_flag() {
    let (base, mock) = start_mock(false).await;
    let client = api_key_client(&base).await;

    let updated = client.activate_workflow("wf-1").await.unwrap();
    assert_eq!(updated["active"], true);

    let sent = mock.updated.lock().unwrap().clone().unwrap();
    assert_eq!(sent["active"], true);
    assert_eq!(sent["name"], "Orders");

    let requests = mock.requests();
    let tail: Vec<&str> = requests.iter().rev().take(2).rev().map(String::as_str).collect();
    assert_eq!(tail, vec!["GET /api/v1/workflows/wf-1", "PUT /api/v1/workflows/wf-1"]);
}

#[tokio::test]
async fn activation_of_missing_workflow_stops_after_get() {
    let (base, mock) = start_mock(false).await;
    let client = api_key_client(&base).await;

    let err = client.activate_workflow("nope").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(!mock.requests().iter().any(|r| r.starts_with("PUT")));
}

#[tokio::test]
async fn execute_wraps_input_data() {
    let (base, _mock) = start_mock(false).await;
    let client = api_key_client(&base).await;

    let result = client
        .execute_workflow("wf-1", Some(json!({"order": 5})))
        .await
        .unwrap();
    assert_eq!(result["executionId"], "exec-1");
    assert_eq!(result["input"], json!({"data": {"order": 5}}));

    let result = client.execute_workflow("wf-1", None).await.unwrap();
    assert_eq!(result["input"], json!({}));
}

#[tokio::test]
async fn session_login_uses_rest_endpoints() {
    let (base, mock) = start_mock(false).await;
    let mut client = N8nClient::new(&base).unwrap();
    client
        .authenticate(&N8nCredentials::login("admin@example.com", "pw"))
        .await
        .unwrap();
    assert_eq!(client.auth_scheme().map(|a| a.name()), Some("session"));

    let workflows = client.list_workflows().await.unwrap();
    assert_eq!(workflows[0].name, "Session flow");
    assert!(mock.requests().contains(&"GET /rest/workflows".to_string()));
}

#[tokio::test]
async fn bad_password_is_an_http_error() {
    let (base, _mock) = start_mock(false).await;
    let mut client = N8nClient::new(&base).unwrap();
    let err = client.login("admin@example.com", "nope").await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn unauthenticated_create_sends_nothing() {
    let (base, mock) = start_mock(false).await;
    let client = N8nClient::new(&base).unwrap();
    let remote: &dyn WorkflowRemote = &client;

    let err = remote.create_workflow(&sample_document()).await.unwrap_err();
    assert!(matches!(err, RemoteError::NotAuthenticated { .. }));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn lazy_remote_authenticates_once_on_first_create() {
    let (base, mock) = start_mock(false).await;
    let remote = LazyN8nClient::new(&base, None, N8nCredentials::api_key(API_KEY));
    assert!(mock.requests().is_empty());

    remote.create_workflow(&sample_document()).await.unwrap();
    remote.create_workflow(&sample_document()).await.unwrap();
    assert!(remote.is_connected());
    assert_eq!(
        mock.requests(),
        vec![
            "GET /api/v1/workflows",
            "POST /api/v1/workflows",
            "POST /api/v1/workflows"
        ]
    );
}

#[tokio::test]
async fn lazy_remote_reports_rejected_key_on_create() {
    let (base, mock) = start_mock(false).await;
    let remote = LazyN8nClient::new(&base, None, N8nCredentials::api_key("wrong"));

    let err = remote.create_workflow(&sample_document()).await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(!remote.is_connected());
    assert_eq!(mock.requests(), vec!["GET /api/v1/workflows"]);
}

#[tokio::test]
async fn connection_report_covers_all_checks() {
    let (base, _mock) = start_mock(false).await;

    let anonymous = N8nClient::new(&base).unwrap();
    let report = anonymous.test_connection().await;
    assert_eq!(report.check("basic_connection").unwrap().status, CheckStatus::Passed);
    assert_eq!(report.check("authentication").unwrap().status, CheckStatus::Failed);
    assert_eq!(report.check("workflows_access").unwrap().status, CheckStatus::Skipped);
    assert_eq!(report.check("node_types_access").unwrap().status, CheckStatus::Passed);
    assert!(!report.is_healthy());

    let client = api_key_client(&base).await;
    let report = client.test_connection().await;
    assert!(report.is_healthy(), "{report:?}");
    assert_eq!(report.auth_scheme.as_deref(), Some("api_key"));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    // Bind then drop a listener to get a port nobody listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = N8nClient::new(&format!("http://127.0.0.1:{port}")).unwrap();
    assert!(matches!(
        client.health_check().await,
        Err(RemoteError::Transport { .. })
    ));
}
