use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("session not found: {0}")]
    NotFound(Uuid),

    #[error("a reply is already in progress for this session")]
    Busy,

    #[error("message is empty")]
    EmptyMessage,

    #[error("message exceeds the maximum length of {0} characters")]
    MessageTooLong(usize),
}
