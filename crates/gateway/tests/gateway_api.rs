//! End-to-end tests over the assembled router.
//!
//! Requests are driven through `tower::ServiceExt::oneshot` — no
//! listener, no network. The store client points at the default local
//! URL but is never contacted: credit enforcement and usage tracking
//! are disabled, and only store-free tools are exercised.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use tower::ServiceExt;

use cf_domain::config::Config;
use cf_gateway::{api, bootstrap};

async fn test_app() -> axum::Router {
    let mut config = Config::default();
    config.tools.enforce_credits = false;
    config.tools.track_usage = false;
    // Guarantee dev mode regardless of the host environment.
    config.server.api_token_env = "CLIPFLOW_TEST_UNSET_TOKEN".into();

    let state = bootstrap::build_app_state(Arc::new(config))
        .await
        .expect("state builds offline");
    api::router(state.clone()).with_state(state)
}

fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ── function endpoint method contract ───────────────────────────────

#[tokio::test]
async fn options_preflight_returns_200_with_empty_body() {
    let app = test_app().await;
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/functions/v1/execute-tool")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn non_post_methods_get_405() {
    for uri in ["/functions/v1/execute-tool", "/functions/v1/multi-agent-chat"] {
        let app = test_app().await;
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{uri}");
    }
}

// ── execute-tool ────────────────────────────────────────────────────

#[tokio::test]
async fn execute_tool_runs_product_shot() {
    let app = test_app().await;
    let response = app
        .oneshot(json_request(
            Method::POST,
            "/functions/v1/execute-tool",
            serde_json::json!({
                "toolName": "product_shot",
                "parameters": {"product_description": "red shoe"},
                "traceId": "run-1",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["success"], true);
    assert!(body["message"].as_str().unwrap().contains("red shoe"));
    // The request id is a fresh UUID per call.
    let request_id = body["data"]["metadata"]["request_id"].as_str().unwrap();
    assert!(uuid::Uuid::parse_str(request_id).is_ok());
}

#[tokio::test]
async fn execute_tool_request_ids_differ_across_calls() {
    let mut ids = Vec::new();
    for _ in 0..2 {
        let app = test_app().await;
        let response = app
            .oneshot(json_request(
                Method::POST,
                "/functions/v1/execute-tool",
                serde_json::json!({
                    "toolName": "product_shot",
                    "parameters": {"product_description": "red shoe"},
                }),
            ))
            .await
            .unwrap();
        let body = response_json(response).await;
        ids.push(body["data"]["metadata"]["request_id"].as_str().unwrap().to_owned());
    }
    assert_ne!(ids[0], ids[1]);
}

#[tokio::test]
async fn execute_tool_unknown_tool_is_404() {
    let app = test_app().await;
    let response = app
        .oneshot(json_request(
            Method::POST,
            "/functions/v1/execute-tool",
            serde_json::json!({"toolName": "teleport", "parameters": {}}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "unknown_tool");
}

#[tokio::test]
async fn execute_tool_bad_params_is_422() {
    let app = test_app().await;
    let response = app
        .oneshot(json_request(
            Method::POST,
            "/functions/v1/execute-tool",
            serde_json::json!({"toolName": "product_shot", "parameters": {"wrong": 1}}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response_json(response).await;
    assert_eq!(body["error"], "invalid_parameters");
}

// ── multi-agent-chat ────────────────────────────────────────────────

#[tokio::test]
async fn multi_agent_chat_without_upstream_is_503() {
    let app = test_app().await;
    let response = app
        .oneshot(json_request(
            Method::POST,
            "/functions/v1/multi-agent-chat",
            serde_json::json!({"messages": [], "agentType": "main", "userId": "u1"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// ── conversation pipeline over HTTP ─────────────────────────────────

#[tokio::test]
async fn submit_message_normalizes_draft() {
    let app = test_app().await;
    let response = app
        .oneshot(json_request(
            Method::POST,
            "/v1/conversations/c1/messages",
            serde_json::json!({"role": "user", "content": "hello"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let message = response_json(response).await;
    assert_eq!(message["type"], "text");
    assert_eq!(message["attachments"], serde_json::json!([]));
    assert!(!message["id"].as_str().unwrap().is_empty());
    // Both timestamps are valid RFC 3339 instants.
    for field in ["created_at", "timestamp"] {
        let raw = message[field].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(raw).is_ok(), "{field}");
    }
}

#[tokio::test]
async fn submit_message_without_role_is_422() {
    let app = test_app().await;
    let response = app
        .oneshot(json_request(
            Method::POST,
            "/v1/conversations/c1/messages",
            serde_json::json!({"content": "hello"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn tool_message_comes_back_with_completed_task() {
    let app = test_app().await;
    let response = app
        .oneshot(json_request(
            Method::POST,
            "/v1/conversations/c1/messages",
            serde_json::json!({
                "role": "user",
                "content": "shoot my product",
                "tool_name": "product_shot",
                "tool_arguments": {"product_description": "red shoe"},
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let message = response_json(response).await;
    assert_eq!(message["status"], "completed");
    assert_eq!(message["tasks"][0]["type"], "task");
    assert_eq!(message["tasks"][0]["status"], "completed");
    assert!(message["tasks"][0]["result"]
        .as_str()
        .unwrap()
        .contains("red shoe"));
}

// ── jobs ────────────────────────────────────────────────────────────

#[tokio::test]
async fn tracked_job_appears_pending_in_snapshot() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/v1/jobs/track",
            serde_json::json!({"kind": "image", "id": "job-1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/jobs/job-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let job = response_json(response).await;
    assert_eq!(job["status"], "pending");
    assert_eq!(job["progress"], 0);
}

#[tokio::test]
async fn untracked_job_is_404() {
    let app = test_app().await;
    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/jobs/nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ── session ─────────────────────────────────────────────────────────

#[tokio::test]
async fn session_roundtrip() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/v1/session",
            serde_json::json!({
                "user_id": "u1",
                "email": "u1@example.com",
                "access_token": "tok",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/v1/session")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = response_json(response).await;
    assert_eq!(body["signed_in"], true);
    assert_eq!(body["session"]["user_id"], "u1");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::DELETE)
                .uri("/v1/session")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/session")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = response_json(response).await;
    assert_eq!(body["signed_in"], false);
}

// ── tools listing ───────────────────────────────────────────────────

#[tokio::test]
async fn tools_listing_contains_builtins() {
    let app = test_app().await;
    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/tools")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let names: Vec<&str> = body["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["browser_use", "image_to_video", "product_shot"]);
}

// ── health ──────────────────────────────────────────────────────────

#[tokio::test]
async fn health_reports_subsystems() {
    let app = test_app().await;
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["tools"], 3);
}
