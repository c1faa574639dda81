//! The store port.
//!
//! The catalog consumes persistence through this capability surface only,
//! so tests run against an in-memory store and production runs against
//! PostgreSQL. Store errors pass through as [`CatalogError::Store`], with
//! one exception: an app lookup that finds no rows becomes
//! [`CatalogError::UnknownApp`].

use async_trait::async_trait;
use update_catalog_domain::{
    App, CatalogResult, Client, Criticality, Group, GroupFilter, Release, ReleaseFilter,
    UpgradeTarget, Variant, VariantFilter,
};
use uuid::Uuid;

/// Abstract persistence for apps, variants, groups, clients and releases.
///
/// Upserts with `allow_update = false` return the pre-existing record on a
/// unique-constraint conflict; callers detect "nothing new happened" by
/// comparing created timestamps.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_app(&self, vendor: &str, product: &str) -> CatalogResult<App>;

    async fn list_apps(&self, limit: usize) -> CatalogResult<Vec<App>>;

    async fn store_app(&self, app: &App, allow_update: bool) -> CatalogResult<App>;

    /// Replace the app's default group links.
    async fn set_app_default_groups(&self, app: &App) -> CatalogResult<App>;

    async fn list_variants(
        &self,
        filter: &VariantFilter,
        limit: usize,
    ) -> CatalogResult<Vec<Variant>>;

    async fn store_variant(&self, variant: &Variant, allow_update: bool) -> CatalogResult<Variant>;

    async fn list_groups(&self, filter: &GroupFilter, limit: usize) -> CatalogResult<Vec<Group>>;

    async fn store_group(&self, group: &Group, allow_update: bool) -> CatalogResult<Group>;

    /// Create a client for the app, returning it with a generated UUID.
    async fn register_client(
        &self,
        app: &App,
        variant: &str,
        groups: &[String],
    ) -> CatalogResult<Client>;

    async fn find_client(&self, uuid: Uuid) -> CatalogResult<Option<Client>>;

    async fn store_release(&self, release: &Release, allow_update: bool) -> CatalogResult<Release>;

    /// Fetch releases matching the filter, ascending by version. A zero
    /// limit means no limit.
    async fn fetch_releases(
        &self,
        filter: &ReleaseFilter,
        limit: usize,
    ) -> CatalogResult<Vec<Release>>;

    /// Recently published releases across all apps, newest first.
    async fn latest_releases(&self, limit: usize) -> CatalogResult<Vec<Release>>;

    async fn set_criticality(
        &self,
        filter: &ReleaseFilter,
        criticality: Criticality,
    ) -> CatalogResult<Vec<Release>>;

    async fn set_stability(
        &self,
        filter: &ReleaseFilter,
        unstable: bool,
    ) -> CatalogResult<Vec<Release>>;

    async fn set_upgrade_target(
        &self,
        filter: &ReleaseFilter,
        target: &UpgradeTarget,
    ) -> CatalogResult<Vec<Release>>;
}
