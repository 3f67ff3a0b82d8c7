//! Embedded templates
//!
//! These are compiled into the binary from .hbs files at build time.

use tracing::debug;

/// Login form
pub const LOGIN: &str = include_str!("../../templates/login.hbs");

/// Progress view and update form
pub const PROGRESS: &str = include_str!("../../templates/progress.hbs");

/// Get the embedded template by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "login" => Some(LOGIN),
        "progress" => Some(PROGRESS),
        _ => {
            debug!(%name, "get_embedded: no embedded template");
            None
        }
    }
}
