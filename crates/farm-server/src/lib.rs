//! HTTP API for the farmstead system.
//!
//! [`router`] builds the axum application over an [`AppState`]; [`serve`]
//! binds it and runs until Ctrl-C or SIGTERM.

pub mod auth;
pub mod envelope;
pub mod error;
pub mod query;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use routes::router;
pub use state::AppState;

use chrono::Utc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use farm_storage::Storage;

/// Serves the API on `bind` until a shutdown signal arrives.
pub async fn serve(state: AppState, bind: &str) -> std::io::Result<()> {
    let purged = state
        .blocking(|s| Ok(s.store().purge_expired_sessions(Utc::now())?))
        .await;
    match purged {
        Ok(0) => {}
        Ok(n) => info!(count = n, "purged expired sessions"),
        Err(e) => warn!(error = %e, "could not purge expired sessions"),
    }

    let listener = TcpListener::bind(bind).await?;
    info!(addr = %listener.local_addr()?, auth = state.config.auth.required, "listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl-C, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }
}
