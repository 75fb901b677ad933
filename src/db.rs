use sqlx::migrate::MigrateError;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Reasons the backing store cannot be brought into a usable state. Both are fatal at
/// startup: the service never serves requests without a reachable, migrated store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("the backing store is unavailable: {0}")]
    StoreUnavailable(#[source] sqlx::Error),
    #[error("could not bring the store's schema up to date: {0}")]
    SchemaSetupFailed(#[source] MigrateError),
}

/// Opens a connection pool against [db_url], failing fast if the store can't be reached
pub async fn connect_sqlx(db_url: &str) -> Result<PgPool, StoreError> {
    PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(2))
        .connect(db_url)
        .await
        .map_err(StoreError::StoreUnavailable)
}

/// Creates or updates the `users` and `tasks` tables to match the entity definitions.
/// Safe to run repeatedly; already-applied migrations are skipped.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(StoreError::SchemaSetupFailed)?;

    info!("Store schema is up to date");
    Ok(())
}
