//! Session actor messages
//!
//! Commands and responses for the actor pattern.

use thiserror::Error;
use tokio::sync::oneshot;

use super::types::{Session, SessionId};

/// Errors from session operations
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Channel error")]
    ChannelError,
}

/// Response from session operations
pub type SessionResponse<T> = Result<T, SessionError>;

/// Commands sent to the SessionManager actor
#[derive(Debug)]
pub enum SessionCommand {
    Get {
        id: SessionId,
        reply: oneshot::Sender<Option<Session>>,
    },
    Put {
        id: SessionId,
        session: Session,
        reply: oneshot::Sender<()>,
    },
    Clear {
        id: SessionId,
        reply: oneshot::Sender<bool>,
    },

    /// Upsert one tool's completion in a live session; replies with the
    /// updated session, or `None` if the session is gone
    RecordProgress {
        id: SessionId,
        tool: String,
        completion: String,
        reply: oneshot::Sender<Option<Session>>,
    },

    /// Drop every entry idle past the timeout; replies with how many were dropped
    PurgeExpired {
        reply: oneshot::Sender<usize>,
    },
    Count {
        reply: oneshot::Sender<usize>,
    },

    Shutdown,
}
