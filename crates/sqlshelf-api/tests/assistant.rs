mod common;

use std::time::Duration;

use axum::{
    Json, Router,
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::{Value, json};

use sqlshelf_api::assistant::{Assistant, AssistantConfig};

use common::{app_with, login_as, send};

/// Stand-in for the generative-language API. Models whose name starts
/// with `broken` fail; the rest echo the last prompt line inside a fence.
async fn fake_generate(Path(call): Path<String>, Json(body): Json<Value>) -> Response {
    let model = call.trim_end_matches(":generateContent");
    if model.starts_with("broken") {
        return (StatusCode::INTERNAL_SERVER_ERROR, "model unavailable").into_response();
    }

    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap_or_default();
    let last_line = prompt.lines().last().unwrap_or_default();
    Json(json!({
        "candidates": [{
            "content": { "parts": [{ "text": format!("```sql\n{} -- via {}\n```", last_line, model) }] }
        }]
    }))
    .into_response()
}

async fn spawn_upstream() -> String {
    let upstream = Router::new().route("/models/{call}", post(fake_generate));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, upstream).await.unwrap();
    });
    format!("http://{}", addr)
}

fn assistant(base_url: String, models: &[&str]) -> Assistant {
    Assistant::new(AssistantConfig {
        api_key: "test-key".into(),
        base_url,
        models: models.iter().map(|m| m.to_string()).collect(),
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

#[tokio::test]
async fn falls_back_to_next_model_and_strips_fence() {
    let base = spawn_upstream().await;
    let app = app_with(Some(assistant(base, &["broken-a", "broken-b", "good"])));
    let token = login_as(&app, "alice", "pw123").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/ai/fix",
        Some(token.as_str()),
        Some(json!({"query": "SELEC 1"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "SELEC 1 -- via good");
}

#[tokio::test]
async fn all_models_failing_is_bad_gateway_without_details() {
    let base = spawn_upstream().await;
    let app = app_with(Some(assistant(base, &["broken-a", "broken-b"])));
    let token = login_as(&app, "alice", "pw123").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/ai/generate",
        Some(token.as_str()),
        Some(json!({"text": "count users"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, json!({"error": "AI service error"}));
}

#[tokio::test]
async fn bad_action_and_missing_input() {
    let base = spawn_upstream().await;
    let app = app_with(Some(assistant(base, &["good"])));
    let token = login_as(&app, "alice", "pw123").await;

    let (status, _) = send(&app, "POST", "/api/ai/drop-tables", Some(token.as_str()), Some(json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "POST", "/api/ai/explain", Some(token.as_str()), Some(json!({"text": "hi"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "query is required");
}
