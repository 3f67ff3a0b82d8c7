//! Signed session cookie
//!
//! The cookie carries only the session id; its signature is checked on every
//! read, so a tampered value reads as "no session".

use axum_extra::extract::SignedCookieJar;
use axum_extra::extract::cookie::{Cookie, Key, SameSite};
use sha2::{Digest, Sha512};
use tracing::debug;

use crate::config::SessionConfig;
use crate::session::SessionId;

/// Derive the 64-byte signing key from a secret of any length
pub fn derive_key(secret: &[u8]) -> Key {
    let digest = Sha512::digest(secret);
    Key::from(digest.as_slice())
}

/// How the session cookie is named and flagged
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub name: String,
    pub secure: bool,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self::from(&SessionConfig::default())
    }
}

impl From<&SessionConfig> for CookieSettings {
    fn from(config: &SessionConfig) -> Self {
        Self {
            name: config.cookie_name.clone(),
            secure: config.secure_cookie,
        }
    }
}

impl CookieSettings {
    /// The session id from a correctly signed cookie, if any
    pub fn session_id(&self, jar: &SignedCookieJar) -> Option<SessionId> {
        let cookie = jar.get(&self.name)?;
        let id = SessionId::parse(cookie.value());
        if id.is_none() {
            debug!(cookie = %self.name, "session_id: signed cookie holds no valid id");
        }
        id
    }

    /// Attach a cookie pointing at `id`
    ///
    /// No expiry is set, so the browser drops it when the browsing session ends.
    pub fn issue(&self, jar: SignedCookieJar, id: &SessionId) -> SignedCookieJar {
        let cookie = Cookie::build((self.name.clone(), id.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure);
        jar.add(cookie)
    }

    /// Instruct the browser to drop the session cookie
    pub fn revoke(&self, jar: SignedCookieJar) -> SignedCookieJar {
        jar.remove(Cookie::build((self.name.clone(), "")).path("/"))
    }
}
