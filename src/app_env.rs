use anyhow::Context;
use std::env;
use std::net::SocketAddr;

/// URL for accessing the PostgreSQL database (should contain a schema name in the path)
pub const DB_URL: &str = "DATABASE_URL";
/// Address the HTTP listener binds to. Defaults to [DEFAULT_SERVER_ADDRESS]
pub const SERVER_ADDRESS: &str = "SERVER_ADDRESS";
/// Log level configuration for the application, in [EnvFilter](tracing_subscriber::EnvFilter) directive syntax
pub const LOG_LEVEL: &str = "LOG_LEVEL";

/// OpenTelemetry span export URL. Should be http://localhost:4317 by default, as the service should
/// have an OpenTelemetry collector sidecar which directs metrics to the correct place
pub const OTEL_SPAN_EXPORT_URL: &str = "OTEL_SPAN_EXPORT_URL";
/// OpenTelemetry metrics export URL. Should be http://localhost:4317 by default, as the service should
/// have an OpenTelemetry collector sidecar which directs metrics to the correct place
pub const OTEL_METRIC_EXPORT_URL: &str = "OTEL_METRIC_EXPORT_URL";

pub const DEFAULT_SERVER_ADDRESS: &str = "0.0.0.0:8000";

/// Everything the server needs to know at startup, read once from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub database_url: String,
    pub bind_address: SocketAddr,
    /// Span and metric export endpoints, only present when both are configured
    pub otel_endpoints: Option<(String, String)>,
}

impl ServerConfig {
    pub fn from_env() -> Result<ServerConfig, anyhow::Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<ServerConfig, anyhow::Error> {
        let database_url =
            lookup(DB_URL).with_context(|| format!("{DB_URL} must be set to start the server"))?;

        let raw_address = lookup(SERVER_ADDRESS).unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.to_owned());
        let bind_address = raw_address
            .parse()
            .with_context(|| format!("{SERVER_ADDRESS} is not a valid socket address: {raw_address}"))?;

        let otel_endpoints = lookup(OTEL_SPAN_EXPORT_URL).zip(lookup(OTEL_METRIC_EXPORT_URL));

        Ok(ServerConfig {
            database_url,
            bind_address,
            otel_endpoints,
        })
    }
}
