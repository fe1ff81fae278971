//! Auxiliary inference handlers: emotion classification, speech synthesis,
//! and the uplifting thought.
//!
//! These endpoints are independent of the chat path and invoked ad hoc by
//! the client.

use crate::AppState;
use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Request body for the emotion and speech endpoints.
#[derive(Debug, Deserialize)]
pub struct TextRequest {
    /// The text to classify or synthesize.
    pub text: String,
}

/// Uplifting thoughts shown on the chat landing view.
const THOUGHTS: &[&str] = &[
    "It's okay not to be okay. Take your time.",
    "Every small step forward is still a step forward.",
    "You are more resilient than you think.",
    "Allow yourself a moment of stillness.",
    "The sun will rise, and we will try again.",
];

/// Handler for `POST /api/emotion`.
///
/// Always answers `200`; an unavailable classifier yields the `"unknown"`
/// sentinel label rather than an error.
pub async fn classify_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<TextRequest>,
) -> Response {
    let text = request.text.trim();
    if text.is_empty() {
        return crate::error_response(StatusCode::BAD_REQUEST, "text is empty");
    }

    let label = state.emotion.classify(text).await;
    Json(json!({ "label": label })).into_response()
}

/// Handler for `POST /api/speech`.
///
/// Returns the synthesized audio payload, or `503` when synthesis is
/// unavailable (missing credential or provider failure).
pub async fn synthesize_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<TextRequest>,
) -> Response {
    let text = request.text.trim();
    if text.is_empty() {
        return crate::error_response(StatusCode::BAD_REQUEST, "text is empty");
    }

    match state.speech.synthesize(text).await {
        Some(clip) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, clip.content_type)
            .body(Body::from(clip.bytes))
            .unwrap_or_else(|_| {
                crate::error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to build audio response",
                )
            }),
        None => crate::error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "speech synthesis is unavailable",
        ),
    }
}

/// Handler for `GET /api/thought`.
pub async fn thought_handler() -> Json<serde_json::Value> {
    let thought = THOUGHTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(THOUGHTS[0]);
    Json(json!({ "thought": thought }))
}
