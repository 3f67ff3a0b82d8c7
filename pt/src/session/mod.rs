//! Session storage with actor pattern
//!
//! SessionManager owns every live session and processes messages via
//! channels. Handlers reach it through the `SessionRepository` trait.

mod manager;
mod messages;
mod repository;
mod types;

pub use manager::SessionManager;
pub use messages::{SessionCommand, SessionError, SessionResponse};
pub use repository::SessionRepository;
pub use types::{Session, SessionId};
