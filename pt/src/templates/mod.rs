//! Page templates
//!
//! Handlebars templates for the login and progress pages, embedded in the
//! binary and optionally overridden from a directory.

mod embedded;
mod loader;

pub use loader::{APP_TITLE, LoginView, ProgressView, TEMPLATE_NAMES, TemplateError, TemplateLoader};
