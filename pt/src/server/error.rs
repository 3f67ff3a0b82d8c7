//! Request-level errors and their HTTP rendering

use axum::extract::rejection::FormRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::auth::AuthError;
use crate::session::SessionError;
use crate::templates::TemplateError;

/// Errors a handler can return
///
/// `Unauthenticated` is recovered as a redirect to the login page; malformed
/// submissions become 400; everything else is a 500 with a generic body.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("Session store error: {0}")]
    Session(#[from] SessionError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn missing_field(field: &str) -> Self {
        Self::InvalidRequest(format!("missing form field '{}'", field))
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthenticated => Self::Unauthenticated,
            // The login handler renders its own form for this; anywhere else it is a bad request
            AuthError::InvalidCredentials => Self::InvalidRequest(AuthError::InvalidCredentials.to_string()),
            AuthError::Hash(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthenticated => Redirect::to("/").into_response(),
            Self::InvalidRequest(message) => {
                warn!(%message, "Rejected malformed request");
                (StatusCode::BAD_REQUEST, format!("Bad request: {}", message)).into_response()
            }
            other => {
                error!(error = %other, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}
