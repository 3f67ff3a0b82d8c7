//! Progress tracker configuration types and loading

use std::collections::HashSet;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// bcrypt accepts work factors in this range
const MIN_BCRYPT_COST: u32 = 4;
const MAX_BCRYPT_COST: u32 = 31;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level", skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Write logs to this file instead of stderr
    #[serde(rename = "log-file", skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,

    /// HTTP listener configuration
    pub server: ServerConfig,

    /// Session cookie and expiry configuration
    pub session: SessionConfig,

    /// Credential store configuration
    pub auth: AuthConfig,

    /// Template override configuration
    pub templates: TemplatesConfig,
}

impl Config {
    /// Load configuration with fallback chain
    ///
    /// 1. Explicit `--config` path
    /// 2. `./progresstracker.yml`
    /// 3. `~/.config/progresstracker/progresstracker.yml`
    /// 4. Built-in defaults
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let local_config = PathBuf::from("progresstracker.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("progresstracker").join("progresstracker.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the logging settings, before logging is initialized
    ///
    /// Errors are swallowed here; the full `load` reports them once logging is up.
    pub fn load_log_settings(config_path: Option<&PathBuf>) -> (Option<String>, Option<PathBuf>) {
        let path = match config_path {
            Some(path) => Some(path.clone()),
            None => {
                let local = PathBuf::from("progresstracker.yml");
                if local.exists() {
                    Some(local)
                } else {
                    dirs::config_dir().map(|dir| dir.join("progresstracker").join("progresstracker.yml"))
                }
            }
        };
        let config: Option<Self> = path
            .and_then(|path| fs::read_to_string(path).ok())
            .and_then(|content| serde_yaml::from_str(&content).ok());
        match config {
            Some(config) => (config.log_level, config.log_file),
            None => (None, None),
        }
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Validate configuration before use
    ///
    /// Call early in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        debug!("Config::validate: called");
        self.server.socket_addr()?;

        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.auth.bcrypt_cost) {
            return Err(eyre!(
                "auth.bcrypt-cost must be between {} and {}, got {}",
                MIN_BCRYPT_COST,
                MAX_BCRYPT_COST,
                self.auth.bcrypt_cost
            ));
        }

        if self.session.idle_timeout_secs == 0 {
            return Err(eyre!("session.idle-timeout-secs must be greater than zero"));
        }
        if self.session.sweep_interval_secs == 0 {
            return Err(eyre!("session.sweep-interval-secs must be greater than zero"));
        }
        if self.session.cookie_name.trim().is_empty() {
            return Err(eyre!("session.cookie-name must not be empty"));
        }
        if self.session.secret_key.as_deref() == Some("") {
            return Err(eyre!("session.secret-key must not be empty when set"));
        }

        let mut seen = HashSet::new();
        for user in &self.auth.users {
            if user.username.trim().is_empty() {
                return Err(eyre!("auth.users contains an entry with an empty username"));
            }
            if user.password_hash.trim().is_empty() {
                return Err(eyre!("auth.users entry '{}' has an empty password-hash", user.username));
            }
            if !seen.insert(user.username.as_str()) {
                return Err(eyre!("auth.users contains duplicate username '{}'", user.username));
            }
        }

        Ok(())
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address and port to listen on
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:5000".to_string(),
        }
    }
}

impl ServerConfig {
    /// Parse the bind address
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.bind
            .parse()
            .map_err(|e| eyre!("server.bind '{}' is not a valid socket address: {}", self.bind, e))
    }
}

/// Session cookie and expiry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Inline secret used to sign session cookies
    #[serde(rename = "secret-key", skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,

    /// Environment variable consulted when no inline secret is set
    #[serde(rename = "secret-key-env")]
    pub secret_key_env: String,

    /// Name of the session cookie
    #[serde(rename = "cookie-name")]
    pub cookie_name: String,

    /// Mark the cookie `Secure` (HTTPS only)
    #[serde(rename = "secure-cookie")]
    pub secure_cookie: bool,

    /// Sessions idle longer than this are discarded
    #[serde(rename = "idle-timeout-secs")]
    pub idle_timeout_secs: u64,

    /// How often the expired-session sweeper runs
    #[serde(rename = "sweep-interval-secs")]
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            secret_key_env: "PT_SECRET_KEY".to_string(),
            cookie_name: "pt_session".to_string(),
            secure_cookie: false,
            idle_timeout_secs: 86_400,
            sweep_interval_secs: 300,
        }
    }
}

impl SessionConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Resolve the signing secret: inline value, then the environment variable
    ///
    /// Returns `None` when neither is set; the caller decides whether to generate one.
    pub fn resolve_secret(&self) -> Option<String> {
        if let Some(ref secret) = self.secret_key {
            debug!("resolve_secret: using inline secret-key");
            return Some(secret.clone());
        }
        match std::env::var(&self.secret_key_env) {
            Ok(secret) if !secret.is_empty() => {
                debug!(env = %self.secret_key_env, "resolve_secret: using secret from environment");
                Some(secret)
            }
            _ => {
                debug!(env = %self.secret_key_env, "resolve_secret: no secret configured");
                None
            }
        }
    }
}

/// A configured user with a pre-computed bcrypt hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEntry {
    pub username: String,

    #[serde(rename = "password-hash")]
    pub password_hash: String,
}

/// Credential store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// bcrypt work factor used when hashing at startup or via `hash-password`
    #[serde(rename = "bcrypt-cost")]
    pub bcrypt_cost: u32,

    /// Registered users; empty means the built-in default user
    pub users: Vec<UserEntry>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: bcrypt::DEFAULT_COST,
            users: Vec::new(),
        }
    }
}

/// Template override configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatesConfig {
    /// Directory holding `login.hbs` / `progress.hbs` overrides
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}
