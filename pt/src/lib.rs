//! ProgressTracker - session-scoped login and tool progress tracker
//!
//! A user logs in against a fixed credential table, then records how far
//! along they are with each tool. Progress lives only as long as the
//! browser session.
//!
//! # Modules
//!
//! - [`auth`] - Read-only credential store backed by bcrypt hashes
//! - [`session`] - Session actor and the repository trait handlers use
//! - [`templates`] - Handlebars page templates
//! - [`server`] - axum router, handlers and serve loop
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use progresstracker::{AppState, Config, router};
//!
//! let config = Config::load(None)?;
//! let (state, sessions) = AppState::from_config(&config)?;
//! let app = router(state);
//! ```

pub mod auth;
pub mod cli;
pub mod config;
pub mod server;
pub mod session;
pub mod templates;

// Re-export commonly used types
pub use auth::{AuthError, CredentialStore, DEFAULT_PASSWORD, DEFAULT_USERNAME, hash_password};
pub use config::{AuthConfig, Config, ServerConfig, SessionConfig, TemplatesConfig, UserEntry};
pub use server::{AppError, AppState, CookieSettings, router};
pub use session::{Session, SessionError, SessionId, SessionManager, SessionRepository, SessionResponse};
pub use templates::{LoginView, ProgressView, TemplateError, TemplateLoader};
