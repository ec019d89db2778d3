use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;
use tracing::info;
use user_service::core::config::{BackendKind, Config};
use user_service::core::startup::{build_backend, shutdown_signal};
use user_service::core::tracing_init::init_tracing;
use user_service::rpc::server::make_user_service;

fn main() -> Result<()> {
    let config_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    let config = Config::from_file(&config_path).context(format!(
        "Failed to load configuration from '{}'",
        config_path.display()
    ))?;

    // Serving the RPC API on top of the RPC backend would call itself
    if config.backend.kind == BackendKind::Grpc {
        bail!("user-grpc-server needs a local backend; set [backend] kind to postgres or memory");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.num_threads)
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    let tracing_guard = {
        let _entered = runtime.enter();
        init_tracing(&config.logging, &config.telemetry)?
    };

    let result = runtime.block_on(serve(config));
    tracing_guard.shutdown();
    result
}

async fn serve(config: Config) -> Result<()> {
    let addr = config.grpc.socket_addr()?;
    let backend = build_backend(&config).await?;

    info!(
        address = %addr,
        backend = ?config.backend.kind,
        "User gRPC server starting"
    );

    tonic::transport::Server::builder()
        .timeout(config.server.request_timeout())
        .add_service(make_user_service(backend))
        .serve_with_shutdown(addr, shutdown_signal())
        .await
        .context("gRPC server error")?;

    info!("Shutting down gracefully");

    Ok(())
}
