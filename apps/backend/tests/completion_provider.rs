//! OpenAI-compatible provider tests against a local stub endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};

use quizgen_backend::config::LlmCredentials;
use quizgen_backend::services::completion::{
    CompletionError, CompletionProvider, OpenAiProvider,
};

#[derive(Clone)]
struct Stub {
    status: StatusCode,
    reply: Value,
    seen: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

async fn chat_completions(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    stub.seen.lock().unwrap().push((auth, body));
    (stub.status, Json(stub.reply.clone()))
}

/// Serve `reply` with `status` and return a provider pointed at it.
async fn provider_for(status: StatusCode, reply: Value) -> (OpenAiProvider, Stub) {
    let stub = Stub {
        status,
        reply,
        seen: Arc::new(Mutex::new(Vec::new())),
    };
    let app = Router::new()
        .route("/v1/chat/completions", post(chat_completions))
        .with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let provider = OpenAiProvider::new(
        reqwest::Client::new(),
        &LlmCredentials {
            api_key: "sk-test".to_string(),
            base_url: format!("http://{}/v1/", addr),
            model: "gpt-4.1".to_string(),
            vision_model: "gpt-4o".to_string(),
        },
    );
    (provider, stub)
}

fn reply_with(content: &str, finish_reason: &str) -> Value {
    json!({
        "choices": [{
            "message": { "role": "assistant", "content": content },
            "finish_reason": finish_reason
        }]
    })
}

#[tokio::test]
async fn test_complete_returns_trimmed_reply() {
    let (provider, stub) =
        provider_for(StatusCode::OK, reply_with("  Question1: A?\nAnswer1: B \n", "stop")).await;

    let reply = provider.complete("make a quiz").await.unwrap();
    assert_eq!(reply, "Question1: A?\nAnswer1: B");

    let seen = stub.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0.as_deref(), Some("Bearer sk-test"));
    assert_eq!(seen[0].1["model"], "gpt-4.1");
    assert_eq!(seen[0].1["messages"][0]["content"], "make a quiz");
}

#[tokio::test]
async fn test_describe_image_uses_vision_model() {
    let (provider, stub) = provider_for(StatusCode::OK, reply_with("Mitosis diagram", "stop")).await;

    let text = provider
        .describe_image("cells.png", "image/png", &[1, 2, 3])
        .await
        .unwrap();
    assert_eq!(text, "Mitosis diagram");

    let seen = stub.seen.lock().unwrap();
    let body = &seen[0].1;
    assert_eq!(body["model"], "gpt-4o");
    assert_eq!(body["messages"][0]["content"][1]["type"], "image_url");
    assert_eq!(
        body["messages"][0]["content"][1]["image_url"]["url"],
        "data:image/png;base64,AQID"
    );
}

#[tokio::test]
async fn test_content_filter_is_an_error() {
    let (provider, _stub) = provider_for(StatusCode::OK, reply_with("", "content_filter")).await;

    let err = provider.complete("prompt").await.unwrap_err();
    assert!(matches!(err, CompletionError::ContentFiltered));
}

#[tokio::test]
async fn test_blank_reply_is_an_error() {
    let (provider, _stub) = provider_for(StatusCode::OK, reply_with("   ", "stop")).await;

    let err = provider.complete("prompt").await.unwrap_err();
    assert!(matches!(err, CompletionError::Empty));
}

#[tokio::test]
async fn test_http_error_keeps_status() {
    let (provider, _stub) = provider_for(
        StatusCode::UNAUTHORIZED,
        json!({ "error": { "message": "invalid api key" } }),
    )
    .await;

    let err = provider.complete("prompt").await.unwrap_err();
    match err {
        CompletionError::Backend { status, message } => {
            assert_eq!(status, 401);
            assert!(message.contains("invalid api key"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_choices_is_decode_error() {
    let (provider, _stub) = provider_for(StatusCode::OK, json!({ "choices": [] })).await;

    let err = provider.complete("prompt").await.unwrap_err();
    assert!(matches!(err, CompletionError::Decode(_)));
}
