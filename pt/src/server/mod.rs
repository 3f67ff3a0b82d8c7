//! HTTP surface
//!
//! | Method/Path     | Handler                  |
//! |-----------------|--------------------------|
//! | GET /           | login form               |
//! | POST /          | verify credentials       |
//! | GET /progress   | show progress            |
//! | POST /progress  | record tool completion   |
//! | GET /logout     | clear session            |

mod cookies;
mod error;
mod routes;
mod state;

use axum::Router;
use axum::routing::get;
use eyre::{Context, Result};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::config::Config;

pub use cookies::{CookieSettings, derive_key};
pub use error::AppError;
pub use routes::{INVALID_CREDENTIALS_MESSAGE, LoginForm, ProgressForm};
pub use state::AppState;

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::login_page).post(routes::login))
        .route("/progress", get(routes::progress_page).post(routes::update_progress))
        .route("/logout", get(routes::logout))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Serve until Ctrl-C / SIGTERM, then drain and stop the session actor
pub async fn serve(config: &Config, listener: TcpListener) -> Result<()> {
    debug!("serve: called");
    let (state, sessions) = AppState::from_config(config)?;
    let app = router(state);

    let addr = listener.local_addr().context("Failed to read listener address")?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    if sessions.shutdown().await.is_err() {
        warn!("Session actor already stopped");
    }
    info!("Server stopped");
    Ok(())
}

/// Bind the configured address
pub async fn bind(config: &Config) -> Result<TcpListener> {
    let addr = config.server.socket_addr()?;
    TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind {}", addr))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("Shutdown signal received");
}
