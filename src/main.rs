use crate::app_env::ServerConfig;
use anyhow::Context;
use axum::extract::State;
use dotenv::dotenv;
use std::sync::Arc;
use tracing::info;

mod api;
mod app_env;
mod db;
mod domain;
mod dto;
mod external_connections;
mod logging;
mod persistence;
mod routes;
mod routing_utils;
mod validation;

/// Data every request handler can reach. Built once at startup.
pub struct SharedData {
    pub ext_cxn: persistence::ExternalConnectivity,
}

pub type AppState = State<Arc<SharedData>>;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenv().ok();
    let config = ServerConfig::from_env()?;

    logging::init_telemetry(config.otel_endpoints.as_ref())?;

    info!("Connecting to the store");
    let pool = db::connect_sqlx(&config.database_url).await?;
    db::ensure_schema(&pool).await?;

    let shared_data = Arc::new(SharedData {
        ext_cxn: persistence::ExternalConnectivity::new(pool),
    });
    let router = routes::build_router(shared_data);

    let listener = tokio::net::TcpListener::bind(config.bind_address)
        .await
        .with_context(|| format!("binding to {}", config.bind_address))?;
    info!("Starting server on {}", config.bind_address);
    axum::serve(listener, router)
        .await
        .context("serving HTTP")
}
