//! End-to-end exchange tests against a mock chat provider.

mod common;

use aura_server::config::Config;
use common::{body_json, body_string, request, router_with};
use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

const CHAT_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

fn config_for(server: &mockito::Server) -> Config {
    let mut config = Config::default();
    config.chat.api_key = "test-key".to_string();
    config.chat.base_url = server.url();
    config.ui.typing_delay_ms = 0;
    config
}

fn reply_body(text: &str) -> String {
    json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
    .to_string()
}

async fn create_session(app: &axum::Router) -> String {
    let response = app
        .clone()
        .oneshot(request("POST", "/api/sessions", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn successful_exchange_streams_chunks_then_done() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", CHAT_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(reply_body("It sounds like you're going through a lot."))
        .create_async()
        .await;

    let app = router_with(config_for(&server));
    let id = create_session(&app).await;
    let uri = format!("/api/sessions/{id}/messages");

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &uri,
            Some(json!({ "content": "I feel really anxious about exams" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    // One chunk per token, in order, then the done event with the full text.
    assert!(body.contains("event: chunk"));
    assert!(body.contains("data: It "));
    assert!(body.contains("event: done"));
    assert!(body.contains("It sounds like you're going through a lot."));
    // No inference token configured: the emotion label degrades quietly.
    assert!(body.contains("\"emotion\":\"unknown\""));
    // General distress is not a crisis; no hotline text is injected.
    assert!(!body.contains("988"));

    let response = app.oneshot(request("GET", &uri, None)).await.unwrap();
    let history = body_json(response).await;
    assert_eq!(history["count"], 2);
    assert_eq!(history["messages"][0]["role"], "user");
    assert_eq!(
        history["messages"][0]["content"],
        "I feel really anxious about exams"
    );
    assert_eq!(history["messages"][1]["role"], "assistant");
}

#[tokio::test]
async fn two_exchanges_hold_four_alternating_turns() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", CHAT_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(reply_body("Thank you for sharing that with me."))
        .expect(2)
        .create_async()
        .await;

    let app = router_with(config_for(&server));
    let id = create_session(&app).await;
    let uri = format!("/api/sessions/{id}/messages");

    for content in ["first message", "second message"] {
        let response = app
            .clone()
            .oneshot(request("POST", &uri, Some(json!({ "content": content }))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        // Drain the stream so the session returns to idle.
        body_string(response).await;
    }

    let response = app.oneshot(request("GET", &uri, None)).await.unwrap();
    let history = body_json(response).await;
    assert_eq!(history["count"], 4);
    for (i, message) in history["messages"].as_array().unwrap().iter().enumerate() {
        let expected = if i % 2 == 0 { "user" } else { "assistant" };
        assert_eq!(message["role"], expected);
    }
}

#[tokio::test]
async fn upstream_failure_leaves_the_conversation_unchanged() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", CHAT_PATH)
        .with_status(500)
        .with_body("internal error")
        .expect_at_least(1)
        .create_async()
        .await;

    let app = router_with(config_for(&server));
    let id = create_session(&app).await;
    let uri = format!("/api/sessions/{id}/messages");

    let response = app
        .clone()
        .oneshot(request("POST", &uri, Some(json!({ "content": "hello" }))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let response = app
        .clone()
        .oneshot(request("GET", &uri, None))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["count"], 0);

    // The session returned to idle, so a retry reaches the provider again
    // instead of tripping the in-flight guard.
    let response = app
        .oneshot(request("POST", &uri, Some(json!({ "content": "hello" }))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn filtered_generation_is_reported_distinctly() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", CHAT_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{ "promptFeedback": { "blockReason": "SAFETY" } }"#)
        .create_async()
        .await;

    let app = router_with(config_for(&server));
    let id = create_session(&app).await;
    let uri = format!("/api/sessions/{id}/messages");

    let response = app
        .clone()
        .oneshot(request("POST", &uri, Some(json!({ "content": "something" }))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app.oneshot(request("GET", &uri, None)).await.unwrap();
    assert_eq!(body_json(response).await["count"], 0);
}

#[tokio::test]
async fn crisis_message_never_reaches_the_provider() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", CHAT_PATH)
        .expect(0)
        .create_async()
        .await;

    let app = router_with(config_for(&server));
    let id = create_session(&app).await;
    let uri = format!("/api/sessions/{id}/messages");

    let response = app
        .oneshot(request(
            "POST",
            &uri,
            Some(json!({ "content": "I've been thinking about ending my life" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("988"));
    mock.assert_async().await;
}
