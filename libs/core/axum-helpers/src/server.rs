//! Server startup, health endpoint, and graceful shutdown.

use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use core_config::server::ServerConfig;
use serde::Serialize;
use std::io;
use tokio::signal;
use tracing::info;

/// Response body for the `/health` endpoint.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub name: &'static str,
    pub version: &'static str,
}

async fn health_handler(
    axum::extract::State((name, version)): axum::extract::State<(&'static str, &'static str)>,
) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            name,
            version,
        }),
    )
}

/// Router exposing `GET /health` for liveness probes.
///
/// Callers pass their own `env!("CARGO_PKG_NAME")` / `env!("CARGO_PKG_VERSION")`.
pub fn health_router(name: &'static str, version: &'static str) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state((name, version))
}

/// Wait for a shutdown signal (SIGTERM or Ctrl+C).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully");
        },
        _ = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully");
        },
    }
}

/// Starts the Axum server with graceful shutdown.
///
/// # Errors
/// Returns an error if:
/// - The TCP listener fails to bind to the configured address
/// - The server encounters an error during operation
pub async fn create_app(router: Router, server_config: &ServerConfig) -> io::Result<()> {
    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;

    info!("Server starting on {}", listener.local_addr()?);
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .inspect_err(|e| {
            tracing::error!("Server encountered an error: {:?}", e);
        })?;

    Ok(())
}
