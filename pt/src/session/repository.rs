//! Storage seam for sessions
//!
//! Handlers only see this trait, so the backing store can change without
//! touching request logic.

use async_trait::async_trait;

use super::messages::SessionResponse;
use super::types::{Session, SessionId};

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Fetch a live session; expired or unknown ids yield `None`
    async fn get(&self, id: &SessionId) -> SessionResponse<Option<Session>>;

    /// Store (insert or replace) a session
    async fn put(&self, id: &SessionId, session: Session) -> SessionResponse<()>;

    /// Record a tool's completion in a live session in one step
    ///
    /// Returns the updated session, or `None` when the id is unknown, expired
    /// or was cleared; a cleared session is never recreated.
    async fn record_progress(&self, id: &SessionId, tool: &str, completion: &str) -> SessionResponse<Option<Session>>;

    /// Remove a session; removing an unknown id is not an error
    async fn clear(&self, id: &SessionId) -> SessionResponse<()>;
}
