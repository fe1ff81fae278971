//! Session and conversation state for the Aura companion backend.
//!
//! Each browser session owns one in-memory, append-only conversation that
//! lives exactly as long as the session. A per-session state machine
//! (`Idle → AwaitingResponse → Rendering → Idle`) serializes exchanges: a
//! new submission while a reply is in flight or rendering is rejected
//! rather than queued.
//!
//! Nothing here is persisted; session state is process-lifetime memory.

pub mod conversation;
pub mod error;
pub mod manager;

pub use conversation::Conversation;
pub use error::SessionError;
pub use manager::{RenderingGuard, SessionConfig, SessionManager, SessionState, SessionSummary};
