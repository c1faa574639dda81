//! PostgreSQL connection pool management.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use update_catalog_domain::{CatalogError, CatalogResult};

/// Pool configuration for the store backend.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Postgres connection string
    pub dsn: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    pub fn new(dsn: impl Into<String>) -> Self {
        Self {
            dsn: dsn.into(),
            max_connections: 20,
            min_connections: 2,
            acquire_timeout: Duration::from_secs(30),
        }
    }

    /// A small pool for tests.
    pub fn test_config(dsn: impl Into<String>) -> Self {
        Self {
            max_connections: 5,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            ..Self::new(dsn)
        }
    }
}

/// Shared connection pool, acquired at process start and released on
/// shutdown.
#[derive(Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    #[instrument(skip(config), fields(max_connections = config.max_connections))]
    pub async fn connect(config: &DatabaseConfig) -> CatalogResult<Self> {
        info!("initializing database connection pool");

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.dsn)
            .await
            .map_err(|e| CatalogError::Store(e.to_string()))?;

        Ok(Self { pool })
    }

    #[inline]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run the embedded schema migrations.
    pub async fn migrate(&self) -> CatalogResult<()> {
        info!("running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| CatalogError::Store(e.to_string()))
    }

    /// Execute a trivial query to verify the connection.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> bool {
        match sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
        {
            Ok(_) => {
                debug!("health check passed");
                true
            }
            Err(e) => {
                warn!(error = %e, "health check failed");
                false
            }
        }
    }

    pub async fn close(&self) {
        info!("closing database pool");
        self.pool.close().await;
    }
}

impl std::fmt::Debug for DatabasePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabasePool")
            .field("size", &self.pool.size())
            .finish()
    }
}
