//! Chat API handlers: session lifecycle and the message exchange.
//!
//! The message endpoint drives the whole exchange: it moves the session
//! through `Idle → AwaitingResponse → Rendering → Idle`, calls the chat
//! provider with the replayed history, and streams the reply back as paced
//! SSE chunks. Any upstream failure aborts the exchange with the
//! conversation unchanged, so a retry sees exactly the state the failed
//! attempt saw.

use crate::pacing;
use crate::AppState;
use aura_inference::{InferenceError, UNKNOWN_EMOTION};
use aura_session::{RenderingGuard, SessionError, SessionSummary};
use aura_types::{persona, Turn};
use axum::{
    extract::Path,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive},
        IntoResponse, Response, Sse,
    },
    Extension, Json,
};
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use uuid::Uuid;

/// Request body for `POST /api/sessions/{sessionId}/messages`.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    /// The user's message text.
    pub content: String,
}

/// Response wrapper for `GET /api/sessions/{sessionId}/messages`.
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    /// The conversation turns in order.
    pub messages: Vec<Turn>,
    /// The number of turns returned.
    pub count: usize,
}

/// Handler for `POST /api/sessions`.
pub async fn create_session_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> impl IntoResponse {
    let summary = state.sessions.create();
    tracing::debug!(session = %summary.id, "created session");
    (StatusCode::CREATED, Json(summary))
}

/// Handler for `GET /api/sessions`.
pub async fn list_sessions_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<Vec<SessionSummary>> {
    Json(state.sessions.list())
}

/// Handler for `DELETE /api/sessions/{sessionId}`.
pub async fn delete_session_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Response {
    match state.sessions.delete(session_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => session_error_response(&e),
    }
}

/// Handler for `GET /api/sessions/{sessionId}/messages`.
pub async fn get_history_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Response {
    match state.sessions.history(session_id) {
        Ok(messages) => {
            let count = messages.len();
            Json(HistoryResponse { messages, count }).into_response()
        }
        Err(e) => session_error_response(&e),
    }
}

/// Handler for `POST /api/sessions/{sessionId}/messages`.
///
/// On success the response is an SSE stream: one `chunk` event per reply
/// token, then a `done` event carrying the full reply and the emotion label
/// for the user's message. On failure the response is a JSON notice and the
/// conversation is left unchanged.
pub async fn send_message_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SendMessageRequest>,
) -> Response {
    let message = request.content.trim().to_string();

    let history = match state.sessions.begin_exchange(session_id, &message) {
        Ok(history) => history,
        Err(e) => return session_error_response(&e),
    };

    // The emotion label decorates the done event; classification runs
    // alongside the upstream call, never on the critical chat path, and
    // degrades to the sentinel.
    let (outcome, emotion) = if persona::indicates_crisis(&message) {
        // Safety first: explicit crisis intent gets the fixed resource text,
        // never a model-generated reply with advice attached.
        tracing::info!(session = %session_id, "crisis phrases detected, returning fixed resources");
        (
            Ok(persona::CRISIS_RESPONSE.to_string()),
            state.emotion.classify(&message).await,
        )
    } else {
        match &state.chat {
            Some(chat) => {
                tokio::join!(chat.send(&history, &message), state.emotion.classify(&message))
            }
            None => (
                Err(InferenceError::Config("chat API key is not set".to_string())),
                UNKNOWN_EMOTION.to_string(),
            ),
        }
    };

    let reply = match outcome {
        Ok(reply) => reply,
        Err(e) => {
            tracing::warn!(session = %session_id, error = %e, "chat exchange failed");
            state.sessions.abort_exchange(session_id);
            return chat_error_response(&e);
        }
    };

    let guard = match state.sessions.complete_exchange(session_id, &message, &reply) {
        Ok(guard) => guard,
        Err(e) => return session_error_response(&e),
    };

    let stream = reply_stream(reply, emotion, state.typing_delay, guard);
    Sse::new(stream)
        .keep_alive(KeepAlive::default())
        .into_response()
}

/// Builds the paced SSE reply stream.
///
/// The rendering guard travels with the stream so the session returns to
/// idle whether the stream is exhausted or dropped mid-way by a
/// disconnecting client.
fn reply_stream(
    reply: String,
    emotion: String,
    delay: Duration,
    guard: RenderingGuard,
) -> impl Stream<Item = Result<Event, Infallible>> {
    let chunks = pacing::pace(&reply, delay)
        .map(|chunk| Ok(Event::default().event("chunk").data(chunk)));
    let done = json!({ "reply": reply, "emotion": emotion }).to_string();
    let done_event = tokio_stream::once(Ok(Event::default().event("done").data(done)));

    GuardedStream {
        inner: Box::pin(chunks.chain(done_event)),
        _guard: guard,
    }
}

/// A stream that carries the session's rendering guard until it is dropped.
struct GuardedStream<S> {
    inner: Pin<Box<S>>,
    _guard: RenderingGuard,
}

impl<S: Stream> Stream for GuardedStream<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<S::Item>> {
        self.get_mut().inner.as_mut().poll_next(cx)
    }
}

/// Maps a session error to its JSON response.
fn session_error_response(error: &SessionError) -> Response {
    let status = match error {
        SessionError::NotFound(_) => StatusCode::NOT_FOUND,
        SessionError::Busy => StatusCode::CONFLICT,
        SessionError::EmptyMessage | SessionError::MessageTooLong(_) => StatusCode::BAD_REQUEST,
    };
    crate::error_response(status, &error.to_string())
}

/// Maps a chat failure to a user-facing transient notice.
fn chat_error_response(error: &InferenceError) -> Response {
    match error {
        InferenceError::Config(_) => crate::error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "chat is not configured on this server",
        ),
        InferenceError::ContentFiltered => crate::error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "the companion could not respond to that message; please try rephrasing",
        ),
        InferenceError::Upstream(_) => crate::error_response(
            StatusCode::BAD_GATEWAY,
            "the companion is temporarily unreachable; please try again",
        ),
    }
}
