//! In-memory [`CatalogStore`] implementation.
//!
//! Mirrors the semantics the SQL store promises: upsert conflicts hand
//! back the pre-existing record, release fetches come back ascending by
//! version, and the app lookup translates "no rows" into `UnknownApp`.

use async_trait::async_trait;
use parking_lot::RwLock;
use update_catalog_application::CatalogStore;
use update_catalog_domain::{
    App, CatalogError, CatalogResult, Client, Criticality, Group, GroupFilter, Release,
    ReleaseFilter, UpgradeTarget, Variant, VariantFilter,
};
use uuid::Uuid;

/// A fully functional store over process memory.
#[derive(Default)]
pub struct MemoryCatalogStore {
    apps: RwLock<Vec<App>>,
    variants: RwLock<Vec<Variant>>,
    groups: RwLock<Vec<Group>>,
    clients: RwLock<Vec<Client>>,
    releases: RwLock<Vec<Release>>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn release_key_matches(a: &Release, b: &Release) -> bool {
        a.vendor == b.vendor
            && a.product == b.product
            && a.variant == b.variant
            && a.os == b.os
            && a.arch == b.arch
            && a.version == b.version
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn find_app(&self, vendor: &str, product: &str) -> CatalogResult<App> {
        self.apps
            .read()
            .iter()
            .find(|app| app.vendor == vendor && app.product == product)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownApp {
                vendor: vendor.to_string(),
                product: product.to_string(),
            })
    }

    async fn list_apps(&self, limit: usize) -> CatalogResult<Vec<App>> {
        let mut apps = self.apps.read().clone();
        apps.sort_by(|a, b| (&a.vendor, &a.product).cmp(&(&b.vendor, &b.product)));
        if limit > 0 {
            apps.truncate(limit);
        }
        Ok(apps)
    }

    async fn store_app(&self, app: &App, allow_update: bool) -> CatalogResult<App> {
        let mut apps = self.apps.write();

        if let Some(existing) = apps
            .iter_mut()
            .find(|a| a.vendor == app.vendor && a.product == app.product)
        {
            if !allow_update {
                return Ok(existing.clone());
            }

            let created = existing.created;
            *existing = app.clone();
            existing.created = created;
            return Ok(existing.clone());
        }

        apps.push(app.clone());
        Ok(app.clone())
    }

    async fn set_app_default_groups(&self, app: &App) -> CatalogResult<App> {
        for name in &app.default_groups {
            let known = self.groups.read().iter().any(|g| {
                g.vendor == app.vendor && g.product == app.product && &g.name == name
            });
            if !known && name != update_catalog_domain::PUBLIC_GROUP {
                return Err(CatalogError::UnknownGroup(name.clone()));
            }
        }

        let mut apps = self.apps.write();
        let existing = apps
            .iter_mut()
            .find(|a| a.vendor == app.vendor && a.product == app.product)
            .ok_or_else(|| CatalogError::UnknownApp {
                vendor: app.vendor.clone(),
                product: app.product.clone(),
            })?;

        existing.default_groups = app
            .default_groups
            .iter()
            .filter(|g| g.as_str() != update_catalog_domain::PUBLIC_GROUP)
            .cloned()
            .collect();

        Ok(existing.clone())
    }

    async fn list_variants(
        &self,
        filter: &VariantFilter,
        limit: usize,
    ) -> CatalogResult<Vec<Variant>> {
        let mut variants: Vec<Variant> = self
            .variants
            .read()
            .iter()
            .filter(|v| {
                v.vendor == filter.vendor
                    && v.product == filter.product
                    && (filter.name.is_empty() || v.name == filter.name)
            })
            .cloned()
            .collect();

        variants.sort_by(|a, b| a.name.cmp(&b.name));
        if limit > 0 {
            variants.truncate(limit);
        }
        Ok(variants)
    }

    async fn store_variant(&self, variant: &Variant, allow_update: bool) -> CatalogResult<Variant> {
        // The owning app must exist.
        self.find_app(&variant.vendor, &variant.product).await?;

        let mut variants = self.variants.write();

        if let Some(existing) = variants.iter_mut().find(|v| {
            v.vendor == variant.vendor && v.product == variant.product && v.name == variant.name
        }) {
            if !allow_update {
                return Ok(existing.clone());
            }

            let created = existing.created;
            *existing = variant.clone();
            existing.created = created;
            return Ok(existing.clone());
        }

        variants.push(variant.clone());
        Ok(variant.clone())
    }

    async fn list_groups(&self, filter: &GroupFilter, limit: usize) -> CatalogResult<Vec<Group>> {
        let mut groups: Vec<Group> = self
            .groups
            .read()
            .iter()
            .filter(|g| {
                g.vendor == filter.vendor
                    && g.product == filter.product
                    && (filter.name.is_empty() || g.name == filter.name)
            })
            .cloned()
            .collect();

        groups.sort_by(|a, b| a.name.cmp(&b.name));
        if limit > 0 {
            groups.truncate(limit);
        }
        Ok(groups)
    }

    async fn store_group(&self, group: &Group, allow_update: bool) -> CatalogResult<Group> {
        self.find_app(&group.vendor, &group.product).await?;

        let mut groups = self.groups.write();

        if let Some(existing) = groups.iter_mut().find(|g| {
            g.vendor == group.vendor && g.product == group.product && g.name == group.name
        }) {
            if !allow_update {
                return Ok(existing.clone());
            }

            let created = existing.created;
            *existing = group.clone();
            existing.created = created;
            return Ok(existing.clone());
        }

        groups.push(group.clone());
        Ok(group.clone())
    }

    async fn register_client(
        &self,
        app: &App,
        variant: &str,
        groups: &[String],
    ) -> CatalogResult<Client> {
        let now = chrono::Utc::now();
        let client = Client {
            uuid: Uuid::new_v4(),
            vendor: app.vendor.clone(),
            product: app.product.clone(),
            variant: variant.to_string(),
            name: String::new(),
            active: true,
            locked: false,
            groups: groups.to_vec(),
            created: now,
            updated: now,
        };

        self.clients.write().push(client.clone());
        Ok(client)
    }

    async fn find_client(&self, uuid: Uuid) -> CatalogResult<Option<Client>> {
        Ok(self
            .clients
            .read()
            .iter()
            .find(|c| c.uuid == uuid)
            .cloned())
    }

    async fn store_release(&self, release: &Release, allow_update: bool) -> CatalogResult<Release> {
        self.find_app(&release.vendor, &release.product).await?;

        if !release.variant.is_empty() {
            let known = self.variants.read().iter().any(|v| {
                v.vendor == release.vendor
                    && v.product == release.product
                    && v.name == release.variant
            });
            if !known {
                return Err(CatalogError::UnknownVariant(release.variant.clone()));
            }
        }

        let mut releases = self.releases.write();

        if let Some(existing) = releases
            .iter_mut()
            .find(|r| Self::release_key_matches(r, release))
        {
            if !allow_update {
                return Ok(existing.clone());
            }

            let date = existing.date;
            *existing = release.clone();
            existing.date = date;
            return Ok(existing.clone());
        }

        releases.push(release.clone());
        Ok(release.clone())
    }

    async fn fetch_releases(
        &self,
        filter: &ReleaseFilter,
        limit: usize,
    ) -> CatalogResult<Vec<Release>> {
        let mut releases: Vec<Release> = self
            .releases
            .read()
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();

        releases.sort_by(|a, b| a.version.cmp(&b.version));
        if limit > 0 {
            releases.truncate(limit);
        }
        Ok(releases)
    }

    async fn latest_releases(&self, limit: usize) -> CatalogResult<Vec<Release>> {
        let mut releases = self.releases.read().clone();
        releases.sort_by(|a, b| b.date.cmp(&a.date));
        if limit > 0 {
            releases.truncate(limit);
        }
        Ok(releases)
    }

    async fn set_criticality(
        &self,
        filter: &ReleaseFilter,
        criticality: Criticality,
    ) -> CatalogResult<Vec<Release>> {
        let mut releases = self.releases.write();
        let mut updated = Vec::new();

        for release in releases.iter_mut().filter(|r| filter.matches(r)) {
            release.should_upgrade = criticality;
            updated.push(release.clone());
        }

        updated.sort_by(|a, b| a.version.cmp(&b.version));
        Ok(updated)
    }

    async fn set_stability(
        &self,
        filter: &ReleaseFilter,
        unstable: bool,
    ) -> CatalogResult<Vec<Release>> {
        let mut releases = self.releases.write();
        let mut updated = Vec::new();

        for release in releases.iter_mut().filter(|r| filter.matches(r)) {
            release.unstable = unstable;
            updated.push(release.clone());
        }

        updated.sort_by(|a, b| a.version.cmp(&b.version));
        Ok(updated)
    }

    async fn set_upgrade_target(
        &self,
        filter: &ReleaseFilter,
        target: &UpgradeTarget,
    ) -> CatalogResult<Vec<Release>> {
        target.validate()?;

        let mut releases = self.releases.write();
        let mut updated = Vec::new();

        for release in releases.iter_mut().filter(|r| filter.matches(r)) {
            release.upgrade_target = target.clone();
            updated.push(release.clone());
        }

        updated.sort_by(|a, b| a.version.cmp(&b.version));
        Ok(updated)
    }
}
