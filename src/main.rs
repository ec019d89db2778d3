use anyhow::{bail, Context, Result};
use axum::serve;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::{TcpListener, UnixListener};
use tower::ServiceBuilder;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{error, info, Level};
use user_service::core::config::Config;
use user_service::core::routes::build_router;
use user_service::core::startup::{build_backend, shutdown_signal};
use user_service::core::state::AppState;
use user_service::core::tracing_init::init_tracing;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let config_path = if args.len() > 1 {
        PathBuf::from(&args[1])
    } else {
        PathBuf::from("config.toml")
    };

    // Load and validate configuration
    let config = Config::from_file(&config_path).context(format!(
        "Failed to load configuration from '{}'. \
        If this is your first time running the service, copy config.example.toml to config.toml and adjust the values.",
        config_path.display()
    ))?;
    config.validate_gateway()?;

    // Build Tokio runtime with configured number of threads
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.num_threads)
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    // Initialize tracing/logging (the OTLP exporter needs the runtime)
    let tracing_guard = {
        let _entered = runtime.enter();
        init_tracing(&config.logging, &config.telemetry)?
    };

    let result = runtime.block_on(async_main(config, config_path));
    tracing_guard.shutdown();
    result
}

async fn async_main(config: Config, config_path: PathBuf) -> Result<()> {
    info!(
        config_path = %config_path.display(),
        port = ?config.server.port,
        unix_socket = ?config.server.unix_socket,
        num_threads = config.server.num_threads,
        backend = ?config.backend.kind,
        log_level = %config.logging.level,
        log_format = %config.logging.format,
        "User service starting"
    );

    let backend = build_backend(&config).await?;
    let state = AppState::from_config(&config, backend);

    info!(
        request_timeout_ms = config.server.request_timeout_ms,
        realm = %config.auth.realm,
        "User service startup complete"
    );

    // Build the router with middleware
    let app = build_router(Arc::new(state)).layer(
        ServiceBuilder::new().layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
        ),
    );

    // Start HTTP server(s)
    let tcp_handle = if let Some(port) = config.server.port {
        let addr = format!("0.0.0.0:{}", port);
        info!(address = %addr, "Starting TCP listener");

        let listener = TcpListener::bind(&addr)
            .await
            .context(format!("Failed to bind TCP listener to {}", addr))?;

        info!(address = %addr, "TCP listener bound successfully");

        let app_clone = app.clone();
        Some(tokio::spawn(async move {
            serve(
                listener,
                app_clone.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("TCP server error")
        }))
    } else {
        None
    };

    let unix_handle = if let Some(unix_socket) = &config.server.unix_socket {
        info!(path = %unix_socket.display(), "Starting Unix socket listener");

        // Remove existing socket file if it exists
        if unix_socket.exists() {
            std::fs::remove_file(unix_socket).context(format!(
                "Failed to remove existing Unix socket: {}",
                unix_socket.display()
            ))?;
        }

        let listener = UnixListener::bind(unix_socket).context(format!(
            "Failed to bind Unix socket listener to {}",
            unix_socket.display()
        ))?;

        info!(path = %unix_socket.display(), "Unix socket listener bound successfully");

        let mut make_service = app.into_make_service();
        Some(tokio::spawn(async move {
            use tower::Service;

            let shutdown = shutdown_signal();
            tokio::pin!(shutdown);

            loop {
                let (socket, _remote_addr) = tokio::select! {
                    _ = &mut shutdown => break,
                    accepted = listener.accept() => match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            error!(error = %e, "Failed to accept Unix socket connection");
                            continue;
                        }
                    },
                };

                let tower_service = match make_service.call(&socket).await {
                    Ok(svc) => svc,
                    Err(infallible) => match infallible {},
                };

                tokio::spawn(async move {
                    let socket = hyper_util::rt::TokioIo::new(socket);

                    let hyper_service = hyper::service::service_fn(
                        move |request: hyper::Request<hyper::body::Incoming>| {
                            tower_service.clone().call(request)
                        },
                    );

                    if let Err(err) = hyper_util::server::conn::auto::Builder::new(
                        hyper_util::rt::TokioExecutor::new(),
                    )
                    .serve_connection_with_upgrades(socket, hyper_service)
                    .await
                    {
                        error!(error = %err, "Error serving Unix socket connection");
                    }
                });
            }

            Ok::<_, anyhow::Error>(())
        }))
    } else {
        None
    };

    info!("HTTP server(s) started, waiting for shutdown signal");

    // Wait for both servers to complete (if they exist)
    match (tcp_handle, unix_handle) {
        (Some(tcp), Some(unix)) => {
            tokio::select! {
                result = tcp => log_server_exit("TCP", result),
                result = unix => log_server_exit("Unix socket", result),
            }
        }
        (Some(tcp), None) => log_server_exit("TCP", tcp.await),
        (None, Some(unix)) => log_server_exit("Unix socket", unix.await),
        (None, None) => {
            error!("No listeners configured");
            bail!("No listeners configured");
        }
    }

    info!("Shutting down gracefully");

    Ok(())
}

fn log_server_exit(kind: &str, result: Result<Result<()>, tokio::task::JoinError>) {
    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(error = %e, server = kind, "Server failed"),
        Err(e) => error!(error = %e, server = kind, "Server task failed"),
    }
}
