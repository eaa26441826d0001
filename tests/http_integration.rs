//! End-to-end HTTP-layer tests, exercised through the full axum `Router`
//! (middleware pipeline + routes) via `tower::ServiceExt::oneshot`, as
//! opposed to `toolcalls-tasks`'s `lifecycle_integration.rs`, which drives
//! the same scenarios one layer down against store/context/handler directly.

use std::sync::Arc;

use http_body_util::BodyExt;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use toolcalls::build_router;
use toolcalls::http::shutdown::ShutdownController;
use toolcalls::http::versioning::ApiVersions;
use toolcalls::state::AppState;

use toolcalls_tasks::security::TenantConfig;
use toolcalls_tasks::store::memory::InMemoryToolCallStore;
use toolcalls_tasks::tools::{AddHandler, CountHandler, PiiHandler, WelcomeHandler};
use toolcalls_tasks::{PhaseManager, ToolCallStore, ToolRegistry};

const API_VERSION: &str = "2025-08-08";

fn app() -> axum::Router {
    let store: Arc<dyn ToolCallStore> = Arc::new(InMemoryToolCallStore::new());
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(AddHandler));
    registry.register(Arc::new(PiiHandler));
    registry.register(Arc::new(WelcomeHandler));
    registry.register(Arc::new(CountHandler));
    let registry = Arc::new(registry);
    let phase_manager = Arc::new(PhaseManager::new(store.clone(), registry.clone()));

    let state = AppState {
        store,
        registry,
        phase_manager,
        tenant: TenantConfig::default(),
        api_versions: ApiVersions::new(API_VERSION),
        shutdown: ShutdownController::new(),
        envelope_key: None,
    };
    build_router(state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn put_request(path: &str, idempotency_key: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(path)
        .header("Api-Version", API_VERSION)
        .header("Idempotency-Key", idempotency_key)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(path: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(path)
        .header("Api-Version", API_VERSION)
        .body(Body::empty())
        .unwrap()
}

fn post_request(path: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header("Api-Version", API_VERSION)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn healthz_is_reachable_without_api_version() {
    let response = app()
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_api_version_is_bad_request() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/mcp/tools")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unsupported_api_version_is_rejected() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/mcp/tools")
                .header("Api-Version", "1999-01-01")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn put_add_creates_and_completes_synchronously() {
    let app = app();
    let response = app
        .oneshot(put_request(
            "/mcp/tools/add/calls/t-1",
            "k1",
            json!({"x": 2, "y": 3}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["result"]["sum"], 5.0);
}

#[tokio::test]
async fn put_retry_with_same_idempotency_key_returns_existing_record() {
    let app = app();
    let first = app
        .clone()
        .oneshot(put_request("/mcp/tools/add/calls/t-2", "k1", json!({"x": 1, "y": 1})))
        .await
        .unwrap();
    let first_body = body_json(first).await;

    let second = app
        .oneshot(put_request("/mcp/tools/add/calls/t-2", "k1", json!({"x": 1, "y": 1})))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    let second_body = body_json(second).await;
    assert_eq!(first_body["etag"], second_body["etag"]);
}

#[tokio::test]
async fn put_retry_with_different_idempotency_key_is_conflict() {
    let app = app();
    app.clone()
        .oneshot(put_request("/mcp/tools/add/calls/t-3", "k1", json!({"x": 1, "y": 1})))
        .await
        .unwrap();

    let response = app
        .oneshot(put_request("/mcp/tools/add/calls/t-3", "k2", json!({"x": 1, "y": 1})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn put_without_idempotency_key_is_bad_request() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/mcp/tools/add/calls/t-4")
                .header("Api-Version", API_VERSION)
                .header("Content-Type", "application/json")
                .body(Body::from(json!({"x": 1, "y": 1}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn put_unknown_tool_is_not_found() {
    let response = app()
        .oneshot(put_request("/mcp/tools/nope/calls/t-5", "k1", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_missing_tool_call_is_not_found() {
    let response = app()
        .oneshot(get_request("/mcp/tools/add/calls/never-created"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_with_matching_if_none_match_is_not_modified_with_empty_body() {
    let app = app();
    let created = app
        .clone()
        .oneshot(put_request("/mcp/tools/add/calls/t-6", "k1", json!({"x": 4, "y": 4})))
        .await
        .unwrap();
    let created_body = body_json(created).await;
    let etag = created_body["etag"].as_str().unwrap().to_string();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/mcp/tools/add/calls/t-6")
                .header("Api-Version", API_VERSION)
                .header("If-None-Match", etag)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn pii_elicitation_accept_round_trip() {
    let app = app();
    let created = app
        .clone()
        .oneshot(put_request("/mcp/tools/pii/calls/t-7", "k1", json!({"key": "ssn"})))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let created_body = body_json(created).await;
    assert_eq!(created_body["status"], "awaitingElicitationResult");

    let advanced = app
        .oneshot(post_request(
            "/mcp/tools/pii/calls/t-7/advance",
            json!({"action": "accept"}),
        ))
        .await
        .unwrap();
    assert_eq!(advanced.status(), StatusCode::OK);
    let advanced_body = body_json(advanced).await;
    assert_eq!(advanced_body["status"], "success");
    assert!(advanced_body["result"].is_object());
}

#[tokio::test]
async fn advance_before_awaiting_status_is_rejected() {
    let app = app();
    app.clone()
        .oneshot(put_request("/mcp/tools/add/calls/t-8", "k1", json!({"x": 1, "y": 1})))
        .await
        .unwrap();

    let response = app
        .oneshot(post_request(
            "/mcp/tools/add/calls/t-8/advance",
            json!({"action": "accept"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cancel_on_a_running_tool_call_clears_phase_state() {
    let app = app();
    app.clone()
        .oneshot(put_request("/mcp/tools/count/calls/t-9", "k1", json!({"countto": 5})))
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/mcp/tools/count/calls/t-9/cancel")
                .header("Api-Version", API_VERSION)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "canceled");
    assert!(body.get("progress").is_none());
}

#[tokio::test]
async fn cancel_on_a_terminal_tool_call_is_a_no_op() {
    let app = app();
    app.clone()
        .oneshot(put_request("/mcp/tools/add/calls/t-10", "k1", json!({"x": 1, "y": 2})))
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/mcp/tools/add/calls/t-10/cancel")
                .header("Api-Version", API_VERSION)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "success");
}

#[tokio::test]
async fn list_tools_returns_all_four_reference_tools() {
    let response = app().oneshot(get_request("/mcp/tools")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["tools"].as_array().unwrap().len(), 4);
}
