//! Credential store
//!
//! A read-only username -> bcrypt hash table built once at startup and shared
//! with request handlers behind an `Arc`.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{AuthConfig, UserEntry};

/// Username registered when the configuration lists no users
pub const DEFAULT_USERNAME: &str = "devops_learner";

/// Password of the built-in default user
pub const DEFAULT_PASSWORD: &str = "password123";

/// Authentication failures
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown username or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Protected route reached without a logged-in session
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// Hash a plaintext password with bcrypt
pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    debug!(cost, "hash_password: called");
    Ok(bcrypt::hash(password, cost)?)
}

/// Read-only registry of users and their password hashes
#[derive(Debug, Clone)]
pub struct CredentialStore {
    users: HashMap<String, String>,
}

impl CredentialStore {
    /// Build from pre-computed entries
    pub fn from_entries(entries: impl IntoIterator<Item = UserEntry>) -> Self {
        let users: HashMap<String, String> = entries
            .into_iter()
            .map(|entry| (entry.username, entry.password_hash))
            .collect();
        debug!(user_count = users.len(), "CredentialStore::from_entries: built");
        Self { users }
    }

    /// Build from configuration, seeding the default user when none are configured
    pub fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        debug!(configured = config.users.len(), "CredentialStore::from_config: called");
        if !config.users.is_empty() {
            info!("Loaded {} user(s) from configuration", config.users.len());
            return Ok(Self::from_entries(config.users.iter().cloned()));
        }

        info!("No users configured, registering default user '{}'", DEFAULT_USERNAME);
        let password_hash = hash_password(DEFAULT_PASSWORD, config.bcrypt_cost)?;
        Ok(Self::from_entries([UserEntry {
            username: DEFAULT_USERNAME.to_string(),
            password_hash,
        }]))
    }

    /// Number of registered users
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Check a username/password pair
    ///
    /// Unknown users and wrong passwords are indistinguishable to the caller.
    /// A stored hash bcrypt cannot parse counts as a failed login.
    pub fn verify(&self, username: &str, password: &str) -> Result<(), AuthError> {
        debug!(%username, "CredentialStore::verify: called");
        let Some(hash) = self.users.get(username) else {
            debug!(%username, "CredentialStore::verify: unknown user");
            return Err(AuthError::InvalidCredentials);
        };

        match bcrypt::verify(password, hash) {
            Ok(true) => {
                debug!(%username, "CredentialStore::verify: password matched");
                Ok(())
            }
            Ok(false) => {
                debug!(%username, "CredentialStore::verify: password mismatch");
                Err(AuthError::InvalidCredentials)
            }
            Err(e) => {
                warn!(%username, error = %e, "Stored password hash is unusable");
                Err(AuthError::InvalidCredentials)
            }
        }
    }
}
