//! Session data carried between requests

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthError;

/// Opaque key identifying one client's session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh random id
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Accept a cookie value only if it has the shape of a generated id
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value).ok().map(|uuid| Self(uuid.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-client state: who is logged in and what they have recorded
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Authenticated username, if any
    pub username: Option<String>,

    /// Tool name -> completion status
    pub progress: BTreeMap<String, String>,
}

impl Session {
    /// A fresh session for a user who just logged in
    pub fn authenticated(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            progress: BTreeMap::new(),
        }
    }

    /// The logged-in username, or `Unauthenticated`
    pub fn require_user(&self) -> Result<&str, AuthError> {
        self.username.as_deref().ok_or(AuthError::Unauthenticated)
    }

    /// Upsert a tool's completion status; last write wins
    ///
    /// Returns the value it replaced, if any.
    pub fn record_progress(&mut self, tool: impl Into<String>, completion: impl Into<String>) -> Option<String> {
        self.progress.insert(tool.into(), completion.into())
    }
}
