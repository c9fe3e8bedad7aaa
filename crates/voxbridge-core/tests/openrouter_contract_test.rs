//! OpenRouter contract tests: request shape and response/error mapping.

use serde_json::json;
use std::time::Duration;
use voxbridge_core::{GenerationError, LanguageModel, OpenRouterBridge, Turn};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn bridge(server: &MockServer) -> OpenRouterBridge {
    OpenRouterBridge::new("or-key", Duration::from_secs(5))
        .unwrap()
        .with_model("test/model")
        .with_base_url(&server.uri())
}

fn completion(content: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "gen-1",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    }))
}

#[tokio::test]
async fn sends_model_history_and_bearer_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer or-key"))
        .and(body_partial_json(json!({
            "model": "test/model",
            "messages": [
                {"role": "system", "content": "sys"},
                {"role": "user", "content": "Hello"}
            ]
        })))
        .respond_with(completion(json!("[happy] Hi there!")))
        .expect(1)
        .mount(&server)
        .await;

    let reply = bridge(&server)
        .complete(&[Turn::system("sys"), Turn::user("Hello")])
        .await
        .unwrap();
    assert_eq!(reply, "[happy] Hi there!");
}

#[tokio::test]
async fn null_content_is_an_empty_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion(serde_json::Value::Null))
        .mount(&server)
        .await;

    let reply = bridge(&server).complete(&[Turn::user("Hello")]).await.unwrap();
    assert!(reply.is_empty());
}

#[tokio::test]
async fn no_choices_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let err = bridge(&server).complete(&[Turn::user("Hello")]).await.unwrap_err();
    assert!(matches!(err, GenerationError::EmptyChoices));
}

#[tokio::test]
async fn rate_limit_maps_to_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Rate limit exceeded"))
        .mount(&server)
        .await;

    let err = bridge(&server).complete(&[Turn::user("Hello")]).await.unwrap_err();
    match err {
        GenerationError::Status { status, body } => {
            assert_eq!(status, 429);
            assert!(body.contains("Rate limit"));
        }
        other => panic!("expected Status, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = bridge(&server).complete(&[Turn::user("Hello")]).await.unwrap_err();
    assert!(matches!(err, GenerationError::Decode(_)));
}
