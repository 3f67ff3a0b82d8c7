//! Shared application state injected into every handler

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use eyre::{Context, Result};
use rand::Rng;
use tracing::{debug, warn};

use super::cookies::{CookieSettings, derive_key};
use crate::auth::CredentialStore;
use crate::config::Config;
use crate::session::{SessionManager, SessionRepository};
use crate::templates::TemplateLoader;

/// Everything a request handler needs
///
/// The credential store and templates are immutable after startup; all
/// mutable state lives behind the session repository.
#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<CredentialStore>,
    pub templates: Arc<TemplateLoader>,
    pub sessions: Arc<dyn SessionRepository>,
    pub cookies: Arc<CookieSettings>,
    key: Key,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}

impl AppState {
    pub fn new(
        credentials: CredentialStore,
        templates: TemplateLoader,
        sessions: Arc<dyn SessionRepository>,
        cookies: CookieSettings,
        secret: &[u8],
    ) -> Self {
        debug!(users = credentials.user_count(), cookie = %cookies.name, "AppState::new: called");
        Self {
            credentials: Arc::new(credentials),
            templates: Arc::new(templates),
            sessions,
            cookies: Arc::new(cookies),
            key: derive_key(secret),
        }
    }

    /// Build state from configuration, spawning the session actor
    ///
    /// Returns the concrete manager too so the caller can shut it down.
    pub fn from_config(config: &Config) -> Result<(Self, SessionManager)> {
        debug!("AppState::from_config: called");
        let secret = match config.session.resolve_secret() {
            Some(secret) => secret.into_bytes(),
            None => {
                warn!(
                    "No session secret configured (set session.secret-key or {}); using a random one",
                    config.session.secret_key_env
                );
                let mut secret = vec![0u8; 64];
                rand::rng().fill(secret.as_mut_slice());
                secret
            }
        };

        let credentials = CredentialStore::from_config(&config.auth).context("Failed to build credential store")?;
        let templates =
            TemplateLoader::new(config.templates.dir.as_deref()).context("Failed to load page templates")?;
        let manager =
            SessionManager::spawn_with_sweeper(config.session.idle_timeout(), config.session.sweep_interval());

        let state = Self::new(
            credentials,
            templates,
            Arc::new(manager.clone()),
            CookieSettings::from(&config.session),
            &secret,
        );
        Ok((state, manager))
    }
}
