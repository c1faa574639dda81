//! Application state and dependency injection.

use async_trait::async_trait;
use std::sync::Arc;
use update_catalog_application::{CatalogService, CatalogStore};
use update_catalog_domain::{CancelToken, CatalogResult, ClientState, UpgradePath, UpgradeStep};

/// Type-erased catalog operations, so route handlers stay independent of
/// the concrete store.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn register_client(
        &self,
        vendor: &str,
        product: &str,
        variant: &str,
    ) -> CatalogResult<ClientState>;

    async fn find_next_upgrade(&self, state: &ClientState) -> CatalogResult<Option<UpgradeStep>>;

    async fn find_upgrade_path(
        &self,
        state: &ClientState,
        cancel: &CancelToken,
    ) -> CatalogResult<Option<UpgradePath>>;
}

#[async_trait]
impl<S: CatalogStore + 'static> CatalogApi for CatalogService<S> {
    async fn register_client(
        &self,
        vendor: &str,
        product: &str,
        variant: &str,
    ) -> CatalogResult<ClientState> {
        CatalogService::register_client(self, vendor, product, variant).await
    }

    async fn find_next_upgrade(&self, state: &ClientState) -> CatalogResult<Option<UpgradeStep>> {
        CatalogService::find_next_upgrade(self, state).await
    }

    async fn find_upgrade_path(
        &self,
        state: &ClientState,
        cancel: &CancelToken,
    ) -> CatalogResult<Option<UpgradePath>> {
        CatalogService::find_upgrade_path(self, state, cancel).await
    }
}

/// Shared state for all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogApi>,
    /// Tripped on shutdown; in-flight planner walks abort with 499.
    pub cancel: CancelToken,
}

impl AppState {
    pub fn new(catalog: Arc<dyn CatalogApi>) -> Self {
        Self {
            catalog,
            cancel: CancelToken::new(),
        }
    }
}
