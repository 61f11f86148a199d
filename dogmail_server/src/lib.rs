//! HTTP boundary of DogMail.
//!
//! One write endpoint, `POST /api/submit-email`, validates the address with
//! the same rule the form uses and appends `{email, timestamp}` to the
//! `emails` collection of a [`DocumentStore`](store::DocumentStore).
//!
//! | Request | Response |
//! |---|---|
//! | valid email, store ok | `200 {"success": true}` |
//! | invalid / missing email, unreadable body | `400 {"error": "Invalid email address"}` |
//! | store failure | `500 {"error": "Failed to save email"}` |

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use dogmail_core::api::types::SUBMIT_EMAIL_PATH;
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod store;

pub use config::ServerConfig;
pub use state::AppState;
pub use store::{DocumentStore, JsonlStore, MemoryStore, PersistenceError, StoredDocument};

use routes::{health_handler, submit_email_handler};

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route(SUBMIT_EMAIL_PATH, post(submit_email_handler))
        .route("/api/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds `config.address()` and serves until Ctrl+C or SIGTERM.
pub async fn start_server(config: ServerConfig, store: Arc<dyn DocumentStore>) -> anyhow::Result<()> {
    let address = config.address();
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;

    serve(listener, store, shutdown_signal()).await
}

/// Serves on an already bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, store: Arc<dyn DocumentStore>, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(AppState::new(store));
    let address = listener.local_addr()?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(err) => {
                error!(error = %err, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(err) => {
                error!(error = %err, "Failed to install signal handler");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
