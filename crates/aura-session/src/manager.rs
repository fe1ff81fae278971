//! Session manager: per-session conversation state and the exchange state
//! machine.
//!
//! Uses `std::sync::Mutex` intentionally: all lock acquisitions are brief
//! HashMap operations that never span `.await` points, making a synchronous
//! lock safe and more efficient than `tokio::sync::Mutex`.

use crate::conversation::Conversation;
use crate::error::SessionError;
use aura_types::Turn;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Where a session is in its exchange cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Ready to accept a submission.
    Idle,
    /// An upstream call is in flight; new submissions are rejected.
    AwaitingResponse,
    /// The reply is being paced out to the client; new submissions are
    /// rejected until the stream finishes.
    Rendering,
}

/// Session tuning knobs.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// Minutes of inactivity after which an idle session expires.
    pub timeout_minutes: i64,
    /// Maximum accepted message length in characters.
    pub max_message_chars: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_minutes: 30,
            max_message_chars: 2000,
        }
    }
}

/// One user's conversation plus its exchange state.
#[derive(Debug)]
struct ChatSession {
    id: Uuid,
    conversation: Conversation,
    state: SessionState,
    started_at: DateTime<Utc>,
    last_message_at: DateTime<Utc>,
}

impl ChatSession {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            conversation: Conversation::new(),
            state: SessionState::Idle,
            started_at: now,
            last_message_at: now,
        }
    }

    fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id,
            state: self.state,
            turn_count: self.conversation.len(),
            started_at: self.started_at.to_rfc3339(),
            last_message_at: self.last_message_at.to_rfc3339(),
        }
    }
}

/// Snapshot of a session for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub state: SessionState,
    pub turn_count: usize,
    pub started_at: String,
    pub last_message_at: String,
}

/// Owns every active session and enforces the exchange state machine.
#[derive(Debug)]
pub struct SessionManager {
    sessions: Mutex<HashMap<Uuid, ChatSession>>,
    config: SessionConfig,
}

impl SessionManager {
    /// Creates an empty manager.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Creates a new empty session and returns its summary.
    pub fn create(&self) -> SessionSummary {
        let session = ChatSession::new();
        let summary = session.summary();
        let mut sessions = self.lock();
        sessions.insert(session.id, session);
        summary
    }

    /// Lists summaries of all live sessions.
    pub fn list(&self) -> Vec<SessionSummary> {
        let sessions = self.lock();
        sessions.values().map(ChatSession::summary).collect()
    }

    /// Deletes a session and its conversation.
    pub fn delete(&self, id: Uuid) -> Result<(), SessionError> {
        let mut sessions = self.lock();
        sessions
            .remove(&id)
            .map(|_| ())
            .ok_or(SessionError::NotFound(id))
    }

    /// Returns the ordered turn history of a session.
    pub fn history(&self, id: Uuid) -> Result<Vec<Turn>, SessionError> {
        let mut sessions = self.lock();
        let session = live_session(&mut sessions, id, self.config.timeout_minutes)?;
        Ok(session.conversation.turns().to_vec())
    }

    /// Starts an exchange: validates the message, moves the session from
    /// `Idle` to `AwaitingResponse`, and returns a snapshot of the history
    /// to replay to the chat provider.
    ///
    /// No turn is recorded yet; the conversation only changes on
    /// [`complete_exchange`](Self::complete_exchange).
    pub fn begin_exchange(&self, id: Uuid, message: &str) -> Result<Vec<Turn>, SessionError> {
        if message.trim().is_empty() {
            return Err(SessionError::EmptyMessage);
        }
        if message.chars().count() > self.config.max_message_chars {
            return Err(SessionError::MessageTooLong(self.config.max_message_chars));
        }

        let mut sessions = self.lock();
        let session = live_session(&mut sessions, id, self.config.timeout_minutes)?;
        if session.state != SessionState::Idle {
            return Err(SessionError::Busy);
        }
        session.state = SessionState::AwaitingResponse;
        Ok(session.conversation.turns().to_vec())
    }

    /// Records a successful exchange: appends the user and assistant turns
    /// as one pair and moves the session to `Rendering`.
    ///
    /// The returned guard moves the session back to `Idle` when dropped, so
    /// a client that disconnects mid-stream cannot wedge the session.
    pub fn complete_exchange(
        self: &Arc<Self>,
        id: Uuid,
        user_text: &str,
        assistant_text: &str,
    ) -> Result<RenderingGuard, SessionError> {
        let mut sessions = self.lock();
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        session.conversation.append(Turn::user(user_text));
        session.conversation.append(Turn::assistant(assistant_text));
        session.state = SessionState::Rendering;
        session.last_message_at = Utc::now();
        Ok(RenderingGuard {
            manager: Arc::clone(self),
            id,
        })
    }

    /// Abandons an exchange after an upstream failure: the session returns
    /// to `Idle` with the conversation unchanged, so the user can retry.
    pub fn abort_exchange(&self, id: Uuid) {
        let mut sessions = self.lock();
        if let Some(session) = sessions.get_mut(&id) {
            if session.state == SessionState::AwaitingResponse {
                session.state = SessionState::Idle;
            }
        }
    }

    fn finish_rendering(&self, id: Uuid) {
        let mut sessions = self.lock();
        if let Some(session) = sessions.get_mut(&id) {
            if session.state == SessionState::Rendering {
                session.state = SessionState::Idle;
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, ChatSession>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Looks up a session, evicting it first if it has expired.
///
/// Only idle sessions expire; a session with an exchange in flight is
/// never reaped out from under it.
fn live_session<'a>(
    sessions: &'a mut HashMap<Uuid, ChatSession>,
    id: Uuid,
    timeout_minutes: i64,
) -> Result<&'a mut ChatSession, SessionError> {
    let expired = sessions.get(&id).is_some_and(|session| {
        session.state == SessionState::Idle
            && Utc::now() - session.last_message_at > chrono::Duration::minutes(timeout_minutes)
    });
    if expired {
        tracing::debug!(session = %id, "evicting expired session");
        sessions.remove(&id);
    }
    sessions.get_mut(&id).ok_or(SessionError::NotFound(id))
}

/// Returns a session to `Idle` when the paced reply stream is exhausted or
/// dropped.
#[derive(Debug)]
pub struct RenderingGuard {
    manager: Arc<SessionManager>,
    id: Uuid,
}

impl Drop for RenderingGuard {
    fn drop(&mut self) {
        self.manager.finish_rendering(self.id);
    }
}
