//! Command context and shared helpers.

pub mod app;
pub mod client;
pub mod group;
pub mod release;
pub mod variant;

use anyhow::Result;
use sqlx::Row;
use std::sync::Arc;
use update_catalog_api_rest::AppState;
use update_catalog_application::CatalogService;
use update_catalog_common::Settings;
use update_catalog_infrastructure::{DatabaseConfig, DatabasePool, PgCatalogStore};

/// Wiring shared by every subcommand: settings, pool, store and service.
pub struct CommandContext {
    pub settings: Settings,
    pub pool: DatabasePool,
    pub store: Arc<PgCatalogStore>,
    pub service: CatalogService<PgCatalogStore>,
}

impl CommandContext {
    pub async fn connect(settings: Settings) -> Result<Self> {
        let dsn = settings.require_postgres_dsn()?;
        let pool = DatabasePool::connect(&DatabaseConfig::new(dsn)).await?;
        let store = Arc::new(PgCatalogStore::new(&pool));
        let service = CatalogService::new(Arc::clone(&store));

        Ok(Self {
            settings,
            pool,
            store,
            service,
        })
    }

    pub async fn serve(&self) -> Result<()> {
        let state = AppState::new(Arc::new(self.service.clone()));
        update_catalog_api_rest::serve(state, self.settings.api_port).await
    }

    pub async fn migrate_up(&self) -> Result<()> {
        self.pool.migrate().await?;
        println!("Migrations applied.");
        Ok(())
    }

    pub async fn migrate_status(&self) -> Result<()> {
        let rows = sqlx::query(
            "SELECT version, description FROM _sqlx_migrations ORDER BY version",
        )
        .fetch_all(self.pool.pool())
        .await?;

        if rows.is_empty() {
            println!("No migrations applied yet.");
            return Ok(());
        }

        for row in rows {
            let version: i64 = row.get("version");
            let description: String = row.get("description");
            println!("{version} {description}");
        }

        Ok(())
    }
}
