use buddy_adapters::gemini::GeminiAdapter;
use buddy_adapters::ollama::OllamaAdapter;
use buddy_adapters::openai::OpenAiAdapter;
use buddy_adapters::{
    AdapterConfig, AdapterError, InferenceRequest, MessageRole, ModelAdapter, PromptMessage,
    ResponseFormat, collect_text,
};
use mockito::Matcher;
use serde_json::json;

fn json_request() -> InferenceRequest {
    InferenceRequest::new(vec![PromptMessage::new(
        MessageRole::User,
        "Startup Idea: a marketplace for used lab equipment",
    )])
    .unwrap()
    .with_system_prompt("You are a startup strategy expert.")
    .with_response_format(ResponseFormat::Json)
}

#[tokio::test]
async fn openai_sends_bearer_and_json_mode() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-4o-mini",
            "response_format": { "type": "json_object" }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"{\"ok\":true}"}}]}"#)
        .expect(1)
        .create_async()
        .await;

    let adapter = OpenAiAdapter::new(
        AdapterConfig::new("gpt-4o-mini")
            .with_api_key("sk-test")
            .with_base_url(server.url())
            .unwrap(),
    )
    .unwrap();

    let stream = adapter.infer(json_request()).await.unwrap();
    assert_eq!(collect_text(stream).await.unwrap(), r#"{"ok":true}"#);
    mock.assert_async().await;
}

#[tokio::test]
async fn gemini_sends_key_in_header() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1beta/models/gemini-2.0-flash:generateContent")
        .match_query(Matcher::Missing)
        .match_header("x-goog-api-key", "g+test/&key=1")
        .match_body(Matcher::PartialJson(json!({
            "generationConfig": { "responseMimeType": "application/json" }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"{}"}]}}]}"#)
        .expect(1)
        .create_async()
        .await;

    let adapter = GeminiAdapter::new(
        AdapterConfig::new("gemini-2.0-flash")
            .with_api_key("g+test/&key=1")
            .with_base_url(server.url())
            .unwrap(),
    )
    .unwrap();

    let stream = adapter.infer(json_request()).await.unwrap();
    assert_eq!(collect_text(stream).await.unwrap(), "{}");
    mock.assert_async().await;
}

#[tokio::test]
async fn ollama_requests_json_format() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/chat")
        .match_body(Matcher::PartialJson(json!({ "format": "json", "stream": false })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":{"role":"assistant","content":"{\"local\":1}"},"done":true}"#)
        .expect(1)
        .create_async()
        .await;

    let adapter =
        OllamaAdapter::new(AdapterConfig::new("llama3.1").with_base_url(server.url()).unwrap())
            .unwrap();

    let stream = adapter.infer(json_request()).await.unwrap();
    assert_eq!(collect_text(stream).await.unwrap(), r#"{"local":1}"#);
    mock.assert_async().await;
}

#[tokio::test]
async fn rate_limit_carries_retry_after() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(429)
        .with_header("retry-after", "7")
        .expect(1)
        .create_async()
        .await;

    let adapter = OpenAiAdapter::new(
        AdapterConfig::new("gpt-4o-mini")
            .with_api_key("sk-test")
            .with_base_url(server.url())
            .unwrap(),
    )
    .unwrap();

    let err = adapter.infer(json_request()).await.err().expect("rate limited");
    match err {
        AdapterError::RateLimited { retry_after } => {
            assert_eq!(retry_after, Some(std::time::Duration::from_secs(7)));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn server_error_includes_status_and_body() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/chat")
        .with_status(500)
        .with_body("model not loaded")
        .create_async()
        .await;

    let adapter =
        OllamaAdapter::new(AdapterConfig::new("llama3.1").with_base_url(server.url()).unwrap())
            .unwrap();

    let err = adapter.infer(json_request()).await.err().expect("server error");
    assert!(matches!(err, AdapterError::Response { .. }));
    let message = err.to_string();
    assert!(message.contains("500"), "{message}");
    assert!(message.contains("model not loaded"), "{message}");
}
