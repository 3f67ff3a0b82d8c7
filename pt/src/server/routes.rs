//! Request handlers for login, progress and logout

use axum::Form;
use axum::extract::State;
use axum::extract::rejection::FormRejection;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::SignedCookieJar;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::error::AppError;
use super::state::AppState;
use crate::auth::AuthError;
use crate::session::{Session, SessionId};
use crate::templates::{LoginView, ProgressView};

/// Error text shown on the login form after a failed attempt
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials";

/// Fields posted by the login form
///
/// Optional so a missing field becomes a 400 instead of an extractor rejection.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Fields posted by the progress form
#[derive(Debug, Deserialize)]
pub struct ProgressForm {
    pub tool: Option<String>,
    pub completion: Option<String>,
}

/// GET /
pub async fn login_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    debug!("login_page: called");
    Ok(Html(state.templates.render_login(&LoginView::blank())?))
}

/// POST /
pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Response, AppError> {
    let Form(form) = form?;
    let username = form.username.ok_or_else(|| AppError::missing_field("username"))?;
    let password = form.password.ok_or_else(|| AppError::missing_field("password"))?;
    debug!(%username, "login: called");

    // bcrypt verification blocks, so it runs on the blocking pool
    let credentials = state.credentials.clone();
    let candidate = username.clone();
    let verified = tokio::task::spawn_blocking(move || credentials.verify(&candidate, &password))
        .await
        .map_err(|e| AppError::Internal(format!("password verification task failed: {}", e)))?;

    match verified {
        Ok(()) => {
            if let Some(previous) = state.cookies.session_id(&jar) {
                debug!(%previous, "login: discarding previous session");
                state.sessions.clear(&previous).await?;
            }

            let id = SessionId::generate();
            state.sessions.put(&id, Session::authenticated(username.as_str())).await?;
            info!(%username, "Login succeeded");

            Ok((state.cookies.issue(jar, &id), Redirect::to("/progress")).into_response())
        }
        Err(AuthError::InvalidCredentials) => {
            warn!(%username, "Login failed: invalid credentials");
            let html = state
                .templates
                .render_login(&LoginView::with_error(INVALID_CREDENTIALS_MESSAGE, &username))?;
            Ok(Html(html).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /progress
pub async fn progress_page(State(state): State<AppState>, jar: SignedCookieJar) -> Result<Html<String>, AppError> {
    debug!("progress_page: called");
    let (_, session) = load_session(&state, &jar).await?;
    render_progress(&state, &session)
}

/// POST /progress
///
/// Authentication is checked before the form, so an anonymous client is
/// redirected even when its submission is malformed.
pub async fn update_progress(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    form: Result<Form<ProgressForm>, FormRejection>,
) -> Result<Html<String>, AppError> {
    let (id, _) = load_session(&state, &jar).await?;

    let Form(form) = form?;
    let tool = form.tool.ok_or_else(|| AppError::missing_field("tool"))?;
    let completion = form.completion.ok_or_else(|| AppError::missing_field("completion"))?;
    debug!(%tool, %completion, "update_progress: called");

    // A logout that lands after load_session leaves nothing to update
    let session = state
        .sessions
        .record_progress(&id, &tool, &completion)
        .await?
        .ok_or(AppError::Unauthenticated)?;
    render_progress(&state, &session)
}

/// GET /logout
pub async fn logout(State(state): State<AppState>, jar: SignedCookieJar) -> Result<impl IntoResponse, AppError> {
    debug!("logout: called");
    if let Some(id) = state.cookies.session_id(&jar) {
        state.sessions.clear(&id).await?;
        info!(%id, "Session cleared");
    }
    Ok((state.cookies.revoke(jar), Redirect::to("/")))
}

/// The caller's session, provided it belongs to a logged-in user
async fn load_session(state: &AppState, jar: &SignedCookieJar) -> Result<(SessionId, Session), AppError> {
    let id = state.cookies.session_id(jar).ok_or(AppError::Unauthenticated)?;
    let session = state
        .sessions
        .get(&id)
        .await?
        .ok_or(AppError::Unauthenticated)?;
    session.require_user()?;
    Ok((id, session))
}

fn render_progress(state: &AppState, session: &Session) -> Result<Html<String>, AppError> {
    let username = session.require_user()?;
    let html = state
        .templates
        .render_progress(&ProgressView::new(username, &session.progress))?;
    Ok(Html(html))
}
