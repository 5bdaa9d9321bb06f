//! HTTP API exposing feed discovery.
//!
//! A single route, `POST /api/find-feeds`, accepts `{"url": "..."}` and answers
//! with `{"feeds": [...]}` or `{"error": "..."}`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::post;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::feed::{FeedFinder, FindOptions};

pub mod handlers;
pub mod models;

/// Path of the discovery endpoint.
pub const FIND_FEEDS_PATH: &str = "/api/find-feeds";

/// Shared state for request handlers.
#[derive(Clone)]
pub struct AppState {
    pub finder: Arc<dyn FeedFinder>,
    pub options: FindOptions,
}

impl AppState {
    pub fn new(finder: Arc<dyn FeedFinder>, options: FindOptions) -> Self {
        Self { finder, options }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(FIND_FEEDS_PATH, post(handlers::find_feeds))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Binds `addr` and serves until SIGINT/SIGTERM.
pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "Listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
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
    tracing::info!("Shutdown signal received");
}
