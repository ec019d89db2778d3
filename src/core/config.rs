// Configuration loading and validation

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub grpc: GrpcConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: Option<u16>,
    pub unix_socket: Option<PathBuf>,
    #[serde(default = "default_num_threads")]
    pub num_threads: usize,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GrpcConfig {
    /// Address the gRPC server binds to
    #[serde(default = "default_grpc_listen_addr")]
    pub listen_addr: String,
    /// Server the gRPC backend connects to
    #[serde(default = "default_grpc_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Postgres,
    Grpc,
    Memory,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct BackendConfig {
    #[serde(default)]
    pub kind: BackendKind,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_db_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
    #[serde(default = "default_realm")]
    pub realm: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_console")]
    pub console: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default)]
    pub enabled: bool,
    /// OTLP gRPC collector
    #[serde(default = "default_otlp_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for GrpcConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_grpc_listen_addr(),
            endpoint: default_grpc_endpoint(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_db_max_connections(),
            acquire_timeout_ms: default_acquire_timeout_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            console: default_console(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_otlp_endpoint(),
            service_name: default_service_name(),
        }
    }
}

// Default value functions
fn default_num_threads() -> usize {
    num_cpus::get()
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_grpc_listen_addr() -> String {
    "0.0.0.0:50051".to_string()
}

fn default_grpc_endpoint() -> String {
    "http://localhost:50051".to_string()
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_acquire_timeout_ms() -> u64 {
    5_000
}

fn default_realm() -> String {
    "ProtectedArea".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_console() -> bool {
    false
}

fn default_otlp_endpoint() -> String {
    "http://127.0.0.1:4317".to_string()
}

fn default_service_name() -> String {
    "user-service".to_string()
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl GrpcConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.listen_addr
            .parse::<SocketAddr>()
            .context(format!("Invalid grpc listen_addr: {}", self.listen_addr))
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        // Validate server config
        if let Some(port) = self.server.port {
            if port == 0 {
                bail!("Server port must be greater than 0");
            }
        }

        if self.server.num_threads == 0 {
            bail!("num_threads must be greater than 0");
        }

        if self.server.request_timeout_ms == 0 {
            bail!("request_timeout_ms must be greater than 0");
        }

        // Validate backend selection
        match self.backend.kind {
            BackendKind::Postgres => {
                if self.database.url.is_empty() {
                    bail!("database.url must not be empty when backend kind is postgres");
                }
                if self.database.max_connections == 0 {
                    bail!("database.max_connections must be greater than 0");
                }
            }
            BackendKind::Grpc => {
                if self.grpc.endpoint.is_empty() {
                    bail!("grpc.endpoint must not be empty when backend kind is grpc");
                }
            }
            BackendKind::Memory => {}
        }

        // Validate auth config
        if self.auth.username.is_empty() {
            bail!("auth.username must not be empty");
        }

        // Validate logging config
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            bail!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.logging.level
            );
        }

        let valid_formats = ["json", "console"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            bail!(
                "Invalid log format '{}'. Must be one of: json, console",
                self.logging.format
            );
        }

        // Validate telemetry config
        if self.telemetry.enabled && self.telemetry.endpoint.is_empty() {
            bail!("telemetry.endpoint must not be empty when telemetry is enabled");
        }

        Ok(())
    }

    /// Extra checks for the HTTP gateway, which needs somewhere to listen
    pub fn validate_gateway(&self) -> Result<()> {
        if self.server.port.is_none() && self.server.unix_socket.is_none() {
            bail!("Either port or unix_socket must be specified in server config");
        }
        Ok(())
    }
}
