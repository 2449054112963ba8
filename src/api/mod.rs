pub mod handlers;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod state;

use std::net::SocketAddr;
use anyhow::{Context, Result};
use axum::Router;
use tokio::signal;
use tracing::{error, info, warn};

use self::state::AppState;

/// HTTP front of the body shape pipeline.
pub struct ApiServer {
    state: AppState,
    addr: SocketAddr,
    body_limit: usize,
}

impl ApiServer {
    pub fn new(state: AppState, addr: SocketAddr, body_limit: usize) -> Self {
        Self { state, addr, body_limit }
    }

    /// Start the API server with graceful shutdown
    pub async fn start(self) -> Result<()> {
        let app = self.create_router();

        info!("Starting body shape API server on {}", self.addr);

        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .with_context(|| format!("failed to bind {}", self.addr))?;

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server shutdown complete");
        Ok(())
    }

    fn create_router(&self) -> Router {
        routes::router(self.state.clone(), self.body_limit)
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, shutting down...");
        },
        _ = terminate => {
            warn!("Received terminate signal, shutting down...");
        },
    }
}
