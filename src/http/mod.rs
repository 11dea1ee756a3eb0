//! REST API module
//!
//! Exposes the Odoo operations as JSON-over-HTTP routes sharing one session.

pub mod error;
pub mod extract;
pub mod routes;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::config::Config;
use crate::error::Result;
use crate::odoo::session::Session;

/// State shared by every route
#[derive(Clone)]
pub struct AppState {
    pub session: Session,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(session: Session, config: Config) -> Self {
        Self {
            session,
            config: Arc::new(config),
        }
    }
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/connect", post(routes::connect))
        .route("/search", post(routes::search))
        .route("/read", post(routes::read))
        .route("/create", post(routes::create))
        .route("/write", post(routes::write))
        .route("/unlink", post(routes::unlink))
        .route("/call", post(routes::call_method))
        .route("/models", post(routes::get_models))
        .route("/fields", post(routes::get_fields))
        .route("/count", post(routes::count))
        .route("/read_group", post(routes::read_group))
        .with_state(state)
}

/// Bind and serve until Ctrl-C
pub async fn serve(state: AppState) -> Result<()> {
    let addr = state.config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Starting {} on {}", routes::SERVICE_NAME, addr);
    tracing::info!("Available endpoints:");
    for (path, description) in routes::ENDPOINTS {
        tracing::info!("  POST {} - {}", path, description);
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
