//! Client for the hosted generative chat provider.
//!
//! Sends one `generateContent` request per conversation turn: the persona
//! instruction once, plus the full ordered turn history ending with the new
//! user message. Each call is at-most-once — there is no retry policy, and
//! failures are surfaced to the caller rather than swallowed.

use crate::config::ChatConfig;
use crate::error::InferenceError;
use aura_types::{Role, Turn};
use serde_json::{json, Value};
use std::time::Duration;

/// Candidate finish reasons that mean the provider blocked generation.
const FILTERED_FINISH_REASONS: &[&str] = &["SAFETY", "PROHIBITED_CONTENT", "BLOCKLIST"];

/// Client for a Gemini-style `generateContent` REST endpoint.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    system_prompt: String,
}

impl ChatClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns `InferenceError::Config` if the API key is empty. Callers
    /// treat that as "chat disabled" rather than a process-fatal condition.
    pub fn new(config: &ChatConfig) -> Result<Self, InferenceError> {
        if config.api_key.is_empty() {
            return Err(InferenceError::Config(
                "chat API key is not set (GEMINI_API_KEY or [chat].api_key)".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| InferenceError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            system_prompt: config.system_prompt.clone(),
        })
    }

    /// Returns the configured model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends the conversation plus one new user message and returns the
    /// assistant reply text.
    ///
    /// `history` must hold every prior turn of the conversation in order;
    /// the provider has no server-side state, so context is replayed on
    /// every call.
    ///
    /// # Errors
    ///
    /// `Upstream` on transport failure, timeout, or a non-success status;
    /// `ContentFiltered` when the provider declines to generate.
    pub async fn send(&self, history: &[Turn], user_text: &str) -> Result<String, InferenceError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = build_request_body(&self.system_prompt, history, user_text);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| InferenceError::Upstream(format!("chat request failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| InferenceError::Upstream(format!("failed to read chat response: {e}")))?;

        if !status.is_success() {
            tracing::warn!(%status, "chat provider returned an error response");
            return Err(InferenceError::Upstream(format!(
                "chat provider returned {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            )));
        }

        parse_reply(&text)
    }
}

/// Builds the `generateContent` request body: persona instruction once,
/// then the full turn history ending with the new user message.
fn build_request_body(system_prompt: &str, history: &[Turn], user_text: &str) -> Value {
    let mut contents: Vec<Value> = history
        .iter()
        .map(|turn| {
            json!({
                "role": provider_role(turn.role),
                "parts": [{ "text": turn.content }]
            })
        })
        .collect();
    contents.push(json!({
        "role": "user",
        "parts": [{ "text": user_text }]
    }));

    json!({
        "system_instruction": { "parts": [{ "text": system_prompt }] },
        "contents": contents
    })
}

/// The provider's wire name for a turn role (`assistant` is `model`).
fn provider_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "model",
    }
}

/// Extracts the reply text from a success response body.
fn parse_reply(body: &str) -> Result<String, InferenceError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| InferenceError::Upstream(format!("chat response was not valid JSON: {e}")))?;

    // A blocked prompt carries no candidates at all.
    if value
        .pointer("/promptFeedback/blockReason")
        .and_then(Value::as_str)
        .is_some()
    {
        return Err(InferenceError::ContentFiltered);
    }

    let candidate = match value
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first())
    {
        Some(candidate) => candidate,
        // Success status but nothing generated: the provider filtered the
        // response without naming a block reason.
        None => return Err(InferenceError::ContentFiltered),
    };

    if let Some(reason) = candidate.get("finishReason").and_then(Value::as_str) {
        if FILTERED_FINISH_REASONS.contains(&reason) {
            return Err(InferenceError::ContentFiltered);
        }
    }

    let parts = candidate
        .pointer("/content/parts")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            InferenceError::Upstream("chat response carried no content parts".to_string())
        })?;

    let reply: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();

    if reply.is_empty() {
        return Err(InferenceError::Upstream(
            "chat response contained no text".to_string(),
        ));
    }

    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_replays_history_in_order() {
        let history = vec![
            Turn::user("I had a rough day"),
            Turn::assistant("Thank you for sharing that with me."),
        ];
        let body = build_request_body("persona", &history, "it got worse");

        let contents = body.get("contents").unwrap().as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["role"], "user");
        assert_eq!(contents[2]["parts"][0]["text"], "it got worse");
    }

    #[test]
    fn request_body_carries_persona_once() {
        let body = build_request_body("persona text", &[], "hello");
        assert_eq!(
            body.pointer("/system_instruction/parts/0/text")
                .and_then(Value::as_str),
            Some("persona text")
        );
    }

    #[test]
    fn parse_reply_concatenates_parts() {
        let body = r#"{
            "candidates": [{
                "content": { "parts": [{ "text": "It sounds like " }, { "text": "a lot." }] },
                "finishReason": "STOP"
            }]
        }"#;
        assert_eq!(parse_reply(body).unwrap(), "It sounds like a lot.");
    }

    #[test]
    fn parse_reply_detects_blocked_prompt() {
        let body = r#"{ "promptFeedback": { "blockReason": "SAFETY" } }"#;
        assert!(matches!(
            parse_reply(body),
            Err(InferenceError::ContentFiltered)
        ));
    }

    #[test]
    fn parse_reply_detects_safety_finish() {
        let body = r#"{
            "candidates": [{ "finishReason": "SAFETY" }]
        }"#;
        assert!(matches!(
            parse_reply(body),
            Err(InferenceError::ContentFiltered)
        ));
    }

    #[test]
    fn parse_reply_empty_candidates_is_filtered() {
        let body = r#"{ "candidates": [] }"#;
        assert!(matches!(
            parse_reply(body),
            Err(InferenceError::ContentFiltered)
        ));
    }

    #[test]
    fn parse_reply_rejects_non_json() {
        assert!(matches!(
            parse_reply("<html>not json</html>"),
            Err(InferenceError::Upstream(_))
        ));
    }

    #[test]
    fn missing_api_key_is_a_config_error() {
        let result = ChatClient::new(&ChatConfig::default());
        assert!(matches!(result, Err(InferenceError::Config(_))));
    }
}
