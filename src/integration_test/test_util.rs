use crate::app_env::test::TEST_DB_URL;
use crate::db;
use dotenv::dotenv;
use lazy_static::lazy_static;
use rand::{Rng, thread_rng};
use sqlx::{Connection, PgConnection, PgPool};
use std::env;
use std::future::Future;
use tokio::runtime::Runtime;

lazy_static! {
    static ref TOKIO_RT: Runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Tokio runtime failed to initialize");
}

/// A throwaway database created next to the one [TEST_DB_URL] points at
struct TestDatabase {
    base_url: String,
    db_name: String,
}

impl TestDatabase {
    async fn create(base_url: &str) -> Result<Self, sqlx::Error> {
        let db_id: u32 = thread_rng().gen_range(10_000..99_999);
        let db_name = format!("test_db_{db_id}");

        let mut conn = PgConnection::connect(base_url).await?;
        let result = sqlx::query(&format!("CREATE DATABASE {db_name}"))
            .execute(&mut conn)
            .await;
        conn.close().await?;
        result?;

        Ok(Self {
            base_url: base_url.to_owned(),
            db_name,
        })
    }

    fn url(&self) -> String {
        format!("{}/{}", self.base_url, self.db_name)
    }

    async fn drop_db(self) {
        let Ok(mut conn) = PgConnection::connect(&self.base_url).await else {
            println!("Warning: could not reconnect to drop {}, you may need to do it manually.", self.db_name);
            return;
        };

        let result = sqlx::query(&format!("DROP DATABASE IF EXISTS {} WITH (FORCE)", self.db_name))
            .execute(&mut conn)
            .await;
        if result.is_err() {
            println!("Warning: failed to drop test database {}, you may need to do it manually.", self.db_name);
        }
        let _ = conn.close().await;
    }
}

/// Runs [test_fn] against a freshly created, fully migrated database which is dropped
/// again afterwards. A failing test leaves its database behind for inspection.
///
/// Expects that the TEST_DB_URL environment variable is populated
pub fn prepare_db_and_test<F, R>(test_fn: F)
where
    R: Future<Output = ()>,
    F: FnOnce(PgPool) -> R,
{
    if dotenv().is_err() {
        println!("Test is running without .env file.");
    }

    TOKIO_RT.block_on(async move {
        let base_url = env::var(TEST_DB_URL).unwrap_or_else(|_| {
            panic!("You must provide the {TEST_DB_URL} environment variable as the base postgres connection string")
        });
        let test_db = TestDatabase::create(&base_url)
            .await
            .unwrap_or_else(|err| panic!("Failed to create test database: {err}"));

        let pool = db::connect_sqlx(&test_db.url())
            .await
            .unwrap_or_else(|err| panic!("Failed to connect to test database: {err}"));
        db::ensure_schema(&pool)
            .await
            .unwrap_or_else(|err| panic!("Failed to migrate test database: {err}"));

        test_fn(pool.clone()).await;

        pool.close().await;
        test_db.drop_db().await;
    });
}
