// Boot-time wiring shared by the binaries

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

use crate::backend::grpc::GrpcBackend;
use crate::backend::memory::MemoryBackend;
use crate::backend::postgres::{connect_pool, PostgresBackend};
use crate::backend::service::SharedBackend;
use crate::core::config::{BackendKind, Config};

/// Build the backend selected by `[backend] kind`
pub async fn build_backend(config: &Config) -> Result<SharedBackend> {
    match config.backend.kind {
        BackendKind::Postgres => {
            let pool = connect_pool(&config.database).await?;
            info!(
                max_connections = config.database.max_connections,
                "Connected to PostgreSQL"
            );
            Ok(Arc::new(PostgresBackend::new(pool)))
        }
        BackendKind::Grpc => {
            let backend = GrpcBackend::connect_lazy(&config.grpc)
                .context("Failed to set up gRPC backend")?;
            info!(endpoint = %config.grpc.endpoint, "Using remote gRPC backend");
            Ok(Arc::new(backend))
        }
        BackendKind::Memory => {
            info!("Using in-memory backend; data is lost on exit");
            Ok(Arc::new(MemoryBackend::new()))
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
