// HTTP contract tests for the hosted backends, against a local mock server

use mockito::Matcher;
use serde_json::json;
use std::sync::Arc;

use roundtable::generators::{BackendFamily, GenerationRequest, Generator, ModelGateway};
use roundtable::providers::{GeminiProvider, LlmProvider, OpenAIProvider, ProviderRequest};
use roundtable::DebateError;

#[tokio::test]
async fn test_openai_chat_completion_roundtrip() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-4",
            "messages": [{"role": "user", "content": "Argue for wind."}]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": "chatcmpl-1",
                "object": "chat.completion",
                "model": "gpt-4",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "\n Wind is cheap. \n"},
                    "finish_reason": "stop"
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let provider = OpenAIProvider::new_openai("sk-test".to_string())
        .unwrap()
        .with_base_url(server.url());
    let response = provider
        .send_message(
            &ProviderRequest::new("Argue for wind.")
                .with_model("gpt-4")
                .with_temperature(0.8),
        )
        .await
        .unwrap();

    assert_eq!(response.text, "Wind is cheap.");
    assert_eq!(response.provider, "openai");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_openai_error_status_surfaces_body() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(429)
        .with_body(r#"{"error": {"message": "Rate limit reached"}}"#)
        .create_async()
        .await;

    let provider = OpenAIProvider::new_openai("sk-test".to_string())
        .unwrap()
        .with_base_url(server.url());
    let err = provider
        .send_message(&ProviderRequest::new("hi").with_model("gpt-4"))
        .await
        .unwrap_err();

    let msg = err.to_string();
    assert!(msg.contains("429"), "{msg}");
    assert!(msg.contains("Rate limit reached"), "{msg}");
}

#[tokio::test]
async fn test_gemini_generate_content_roundtrip() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/models/gemini-pro:generateContent")
        .match_header("x-goog-api-key", "g-test")
        .match_body(Matcher::PartialJson(json!({
            "contents": [{"role": "user", "parts": [{"text": "Argue for coal."}]}]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "Coal keeps "}, {"text": "the lights on."}]},
                    "finishReason": "STOP"
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let provider = GeminiProvider::new("g-test".to_string())
        .unwrap()
        .with_base_url(server.url());
    let response = provider
        .send_message(&ProviderRequest::new("Argue for coal.").with_model("gemini-pro"))
        .await
        .unwrap();

    assert_eq!(response.text, "Coal keeps the lights on.");
    assert_eq!(response.model, "gemini-pro");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_gateway_wraps_backend_failure_as_upstream() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/models/gemini-pro:generateContent")
        .with_status(403)
        .with_body("API key not valid")
        .create_async()
        .await;

    let provider = GeminiProvider::new("bad".to_string())
        .unwrap()
        .with_base_url(server.url());
    let gateway =
        ModelGateway::empty().with_provider(BackendFamily::GenerativeText, Arc::new(provider));

    let err = gateway
        .generate(&GenerationRequest::new("hi", "gemini-pro", 0.8))
        .await
        .unwrap_err();

    match &err {
        DebateError::Upstream { provider, detail } => {
            assert_eq!(provider, "gemini");
            assert!(detail.contains("403"), "{detail}");
            assert!(detail.contains("API key not valid"), "{detail}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_gateway_routes_gpt_models_to_chat_completions() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_body(Matcher::PartialJson(json!({"model": "gpt-3.5-turbo"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "model": "gpt-3.5-turbo",
                "choices": [{"message": {"content": "ok"}, "finish_reason": "stop"}]
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let provider = OpenAIProvider::new_openai("sk".to_string())
        .unwrap()
        .with_base_url(server.url());
    let gateway =
        ModelGateway::empty().with_provider(BackendFamily::ChatCompletion, Arc::new(provider));

    let text = gateway
        .generate(&GenerationRequest::new("hi", "gpt-3.5-turbo", 0.2))
        .await
        .unwrap();
    assert_eq!(text, "ok");
    mock.assert_async().await;
}
