//! Server setup and lifecycle management

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::api::{build_router, AppState};
use crate::config::{LedgerConfig, ServerConfig};
use crate::storage::Repository;

/// Owns the ledger pool for the lifetime of the HTTP listener.
pub struct Server {
    ledger: LedgerConfig,
    server: ServerConfig,
}

impl Server {
    pub fn new(ledger: LedgerConfig, server: ServerConfig) -> Self {
        Self { ledger, server }
    }

    /// Connect and migrate, serve until SIGINT/SIGTERM, then close the pool.
    /// Failing to create the pool is fatal.
    pub async fn run(self) -> Result<()> {
        let repo = Arc::new(
            Repository::init(&self.ledger)
                .await
                .context("Failed to initialise ledger")?,
        );

        let app = build_router(AppState::new(repo.clone()));

        let addr = self.server.listen_addr();
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        info!("Core banking API listening on {}", addr);

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP server failed");

        info!("Core banking API shutting down");
        repo.close().await;

        served
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
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
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
