use aura_inference::{ChatClient, ChatConfig, InferenceError};
use aura_types::Turn;

fn config_for(server: &mockito::Server) -> ChatConfig {
    ChatConfig {
        api_key: "test-key".to_string(),
        base_url: server.url(),
        ..ChatConfig::default()
    }
}

const CHAT_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

#[tokio::test]
async fn send_returns_reply_text() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", CHAT_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "candidates": [{
                    "content": { "parts": [{ "text": "It sounds like you're going through a lot." }] },
                    "finishReason": "STOP"
                }]
            }"#,
        )
        .create_async()
        .await;

    let client = ChatClient::new(&config_for(&server)).unwrap();
    let history = vec![
        Turn::user("hi"),
        Turn::assistant("Hello, how are you feeling today?"),
    ];
    let reply = client.send(&history, "I'm overwhelmed").await.unwrap();
    assert_eq!(reply, "It sounds like you're going through a lot.");
}

#[tokio::test]
async fn blocked_generation_is_content_filtered() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", CHAT_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{ "promptFeedback": { "blockReason": "SAFETY" } }"#)
        .create_async()
        .await;

    let client = ChatClient::new(&config_for(&server)).unwrap();
    let result = client.send(&[], "something blocked").await;
    assert!(matches!(result, Err(InferenceError::ContentFiltered)));
}

#[tokio::test]
async fn server_error_is_upstream() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", CHAT_PATH)
        .with_status(500)
        .with_body("internal error")
        .create_async()
        .await;

    let client = ChatClient::new(&config_for(&server)).unwrap();
    let result = client.send(&[], "hello").await;
    assert!(matches!(result, Err(InferenceError::Upstream(_))));
}

#[tokio::test]
async fn unreachable_provider_is_upstream() {
    // Port 9 (discard) is never listening in the test environment.
    let config = ChatConfig {
        api_key: "test-key".to_string(),
        base_url: "http://127.0.0.1:9".to_string(),
        timeout_secs: 1,
        ..ChatConfig::default()
    };
    let client = ChatClient::new(&config).unwrap();
    let result = client.send(&[], "hello").await;
    assert!(matches!(result, Err(InferenceError::Upstream(_))));
}
