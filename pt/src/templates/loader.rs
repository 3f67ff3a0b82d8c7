//! Template Loader
//!
//! Registers page templates from an override directory or falls back to
//! embedded defaults, then renders them with Handlebars.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use handlebars::Handlebars;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use super::embedded;

/// Title shown on every page
pub const APP_TITLE: &str = "DevOps Progress Tracker";

/// Names of every template the application renders
pub const TEMPLATE_NAMES: [&str; 2] = ["login", "progress"];

/// Errors from loading or rendering templates
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Failed to read template {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse template {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: Box<handlebars::TemplateError>,
    },

    #[error("Failed to render template: {0}")]
    Render(#[from] handlebars::RenderError),
}

/// Context for the login page
#[derive(Debug, Clone, Serialize)]
pub struct LoginView<'a> {
    pub title: &'a str,
    /// Inline error shown above the form
    pub error: Option<&'a str>,
    /// Username to pre-fill after a failed attempt
    pub username: Option<&'a str>,
}

impl<'a> LoginView<'a> {
    pub fn blank() -> Self {
        Self {
            title: APP_TITLE,
            error: None,
            username: None,
        }
    }

    pub fn with_error(error: &'a str, username: &'a str) -> Self {
        Self {
            title: APP_TITLE,
            error: Some(error),
            username: Some(username),
        }
    }
}

/// Context for the progress page
#[derive(Debug, Clone, Serialize)]
pub struct ProgressView<'a> {
    pub title: &'a str,
    pub username: &'a str,
    pub has_progress: bool,
    pub progress: &'a BTreeMap<String, String>,
}

impl<'a> ProgressView<'a> {
    pub fn new(username: &'a str, progress: &'a BTreeMap<String, String>) -> Self {
        Self {
            title: APP_TITLE,
            username,
            has_progress: !progress.is_empty(),
            progress,
        }
    }
}

/// Loads and renders page templates
pub struct TemplateLoader {
    hbs: Handlebars<'static>,
}

impl TemplateLoader {
    /// Register every template, preferring `{dir}/{name}.hbs` when a directory is given
    pub fn new(override_dir: Option<&Path>) -> Result<Self, TemplateError> {
        debug!(?override_dir, "TemplateLoader::new: called");
        let mut hbs = Handlebars::new();

        for name in TEMPLATE_NAMES {
            let source = load_template(override_dir, name)?;
            hbs.register_template_string(name, source)
                .map_err(|e| TemplateError::Parse {
                    name: name.to_string(),
                    source: Box::new(e),
                })?;
        }

        Ok(Self { hbs })
    }

    /// A loader that only uses embedded templates
    pub fn embedded_only() -> Result<Self, TemplateError> {
        Self::new(None)
    }

    pub fn render_login(&self, view: &LoginView<'_>) -> Result<String, TemplateError> {
        debug!(has_error = view.error.is_some(), "TemplateLoader::render_login: called");
        Ok(self.hbs.render("login", view)?)
    }

    pub fn render_progress(&self, view: &ProgressView<'_>) -> Result<String, TemplateError> {
        debug!(username = %view.username, entries = view.progress.len(), "TemplateLoader::render_progress: called");
        Ok(self.hbs.render("progress", view)?)
    }
}

/// Load a template by name
///
/// Checks in order:
/// 1. Override: `{dir}/{name}.hbs`
/// 2. Embedded fallback
fn load_template(override_dir: Option<&Path>, name: &str) -> Result<String, TemplateError> {
    debug!(%name, "load_template: called");
    if let Some(dir) = override_dir {
        let path = dir.join(format!("{}.hbs", name));
        if path.exists() {
            info!("Using template override {}", path.display());
            return std::fs::read_to_string(&path).map_err(|source| TemplateError::Read { path, source });
        }
        debug!(?path, "load_template: no override, using embedded");
    }

    embedded::get_embedded(name)
        .map(str::to_string)
        .ok_or_else(|| TemplateError::NotFound(name.to_string()))
}
