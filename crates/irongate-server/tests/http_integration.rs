//! HTTP-level integration tests for the Iron Gate proxy: build a real
//! router over in-memory stores and drive it with
//! `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use irongate_core::{
    EventQueue, FirmConfigStore, InMemoryChainStore, LlmClient, LlmCompletion, NoopEventMirror,
    ProxyOrchestrator, Result,
};
use irongate_server::router::build_router;
use irongate_server::state::AppState;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

struct EchoLlm;

#[async_trait::async_trait]
impl LlmClient for EchoLlm {
    async fn complete(&self, masked_prompt: &str, _model: Option<&str>) -> Result<LlmCompletion> {
        Ok(LlmCompletion {
            text: format!("echo: {masked_prompt}"),
            model: "test-model".to_string(),
            provider: "test-provider".to_string(),
            prompt_tokens: 7,
            completion_tokens: 3,
        })
    }
}

fn build_test_app() -> (axum::Router, Arc<dyn irongate_core::ChainStore>) {
    let chain: Arc<dyn irongate_core::ChainStore> = Arc::new(InMemoryChainStore::new());
    let queue = Arc::new(EventQueue::new(Arc::new(NoopEventMirror)));
    let orchestrator = Arc::new(ProxyOrchestrator::new(
        Arc::new(FirmConfigStore::new()),
        Arc::clone(&chain),
        queue,
        Arc::new(EchoLlm),
    ));
    let state = Arc::new(AppState { orchestrator, chain: Arc::clone(&chain) });
    (build_router(state), chain)
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn analyze_email_is_passthrough_and_unmasked() {
    let (app, _chain) = build_test_app();
    let body = json!({
        "text": "Email me at alice@example.com",
        "aiToolId": "chatgpt",
        "sessionId": Uuid::new_v4().to_string(),
        "firmId": "firm1",
    });
    let resp = app
        .oneshot(json_request("POST", "/analyze", body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["recommendedRoute"], "passthrough");
    assert_eq!(body["maskedPrompt"], "Email me at alice@example.com");
}

#[tokio::test]
async fn analyze_accepts_prompt_text_alias() {
    let (app, _chain) = build_test_app();
    let body = json!({
        "promptText": "hello there",
        "aiToolId": "chatgpt",
        "sessionId": Uuid::new_v4().to_string(),
    });
    let resp = app
        .oneshot(json_request("POST", "/analyze", body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn analyze_then_send_round_trips_through_llm() {
    let (app, _chain) = build_test_app();
    let session_id = Uuid::new_v4();

    let analyze_body = json!({
        "text": "SSN 123-45-6789 needs review",
        "aiToolId": "chatgpt",
        "sessionId": session_id.to_string(),
        "firmId": "firm1",
    });
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/analyze", analyze_body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let analyzed = body_json(resp).await;
    assert_ne!(analyzed["recommendedRoute"], "passthrough");

    let send_body = json!({
        "maskedPrompt": analyzed["maskedPrompt"],
        "route": analyzed["recommendedRoute"],
        "sessionId": session_id.to_string(),
        "firmId": "firm1",
    });
    let resp = app
        .oneshot(json_request("POST", "/send", send_body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let sent = body_json(resp).await;
    assert!(sent["response"].as_str().unwrap().starts_with("echo: "));
}

#[tokio::test]
async fn send_rejects_zero_max_tokens() {
    let (app, _chain) = build_test_app();
    let body = json!({
        "maskedPrompt": "hello",
        "route": "passthrough",
        "sessionId": Uuid::new_v4().to_string(),
        "maxTokens": 0,
    });
    let resp = app
        .oneshot(json_request("POST", "/send", body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn send_rejects_out_of_range_temperature() {
    let (app, _chain) = build_test_app();
    let body = json!({
        "maskedPrompt": "hello",
        "route": "passthrough",
        "sessionId": Uuid::new_v4().to_string(),
        "temperature": 3.5,
    });
    let resp = app
        .oneshot(json_request("POST", "/send", body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

fn sample_event(firm_id: &str) -> Value {
    json!({
        "event_id": Uuid::new_v4().to_string(),
        "firm_id": firm_id,
        "user_id": null,
        "ai_tool_id": "chatgpt",
        "prompt_hash": "abc123",
        "prompt_length": 42,
        "sensitivity_score": 10,
        "sensitivity_level": "low",
        "entity_type_counts": {},
        "action": "pass",
        "capture_method": "browser_extension",
        "session_id": Uuid::new_v4().to_string(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "metadata": {},
    })
}

#[tokio::test]
async fn events_batch_accepts_and_appends_to_chain() {
    let (app, chain) = build_test_app();
    let body = json!({
        "batchId": "batch-1",
        "events": [sample_event("firm1")],
    });
    let resp = app
        .oneshot(json_request("POST", "/events/batch", body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let result = body_json(resp).await;
    assert_eq!(result["accepted"], 1);

    let verification = chain.verify("firm1").await.unwrap();
    assert!(verification.valid);
    assert_eq!(verification.total_events, 1);
}

#[tokio::test]
async fn events_batch_rejects_empty_batch_id() {
    let (app, _chain) = build_test_app();
    let body = json!({
        "batchId": "",
        "events": [sample_event("firm1")],
    });
    let resp = app
        .oneshot(json_request("POST", "/events/batch", body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn events_batch_rejects_malformed_body() {
    let (app, _chain) = build_test_app();
    let resp = app
        .oneshot(json_request("POST", "/events/batch", json!({"nonsense": true})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
