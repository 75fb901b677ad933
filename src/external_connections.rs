use sqlx::PgConnection;

/// A live handle onto a database connection which driven adapters can run queries against
pub trait ConnectionHandle {
    fn borrow_connection(&mut self) -> &mut PgConnection;
}

/// Owns the clients used to reach systems outside this service. Business logic only ever
/// sees this trait so the driven adapters behind it can be swapped out (for example with
/// in-memory fakes in tests).
pub trait ExternalConnectivity {
    type DbHandle<'cxn_borrow>: ConnectionHandle + Send
    where
        Self: 'cxn_borrow;

    async fn database_cxn(&mut self) -> Result<Self::DbHandle<'_>, anyhow::Error>;
}
