//! The user-facing catalog service.
//!
//! Composes store access, the release filter and the planner into the
//! public operations. The service owns the data-flow invariant of the
//! planner: every candidate set it passes along already respects variant,
//! OS, arch, stability and group constraints for the requesting client.

use crate::store::CatalogStore;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use update_catalog_domain::{
    planner, App, CancelToken, CatalogError, CatalogResult, ClientState, Criticality, Release,
    UpgradePath, UpgradeStep, Variant, VariantFilter, Version, PUBLIC_GROUP,
};
use uuid::Uuid;

/// The catalog operations served to clients.
pub struct CatalogService<S: CatalogStore> {
    store: Arc<S>,
}

impl<S: CatalogStore> CatalogService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Register a new client installation.
    ///
    /// Fails with `UnknownApp` for missing or inactive apps and with
    /// `RegistrationForbidden` when the app (or the requested variant)
    /// disallows self-registration. The fresh client inherits the variant's
    /// default groups, falling back to the app's.
    #[instrument(skip(self))]
    pub async fn register_client(
        &self,
        vendor: &str,
        product: &str,
        variant: &str,
    ) -> CatalogResult<ClientState> {
        if vendor.is_empty() || product.is_empty() {
            return Err(CatalogError::InvalidInput(
                "vendor and product must be given".to_string(),
            ));
        }

        let app = self.active_app(vendor, product).await?;

        if !app.allow_register {
            return Err(CatalogError::RegistrationForbidden);
        }

        let mut default_groups = app.default_groups.clone();

        if !variant.is_empty() {
            let app_variant = self.find_variant(vendor, product, variant).await?;

            if !app_variant.allow_register {
                return Err(CatalogError::RegistrationForbidden);
            }

            if !app_variant.default_groups.is_empty() {
                default_groups = app_variant.default_groups.clone();
            }
        }

        // A lone "public" default means no group links at all.
        default_groups.retain(|g| g != PUBLIC_GROUP);

        let client = self
            .store
            .register_client(&app, variant, &default_groups)
            .await?;

        info!(client_id = %client.uuid, vendor, product, variant, "client registered");

        Ok(ClientState {
            client_id: client.uuid.to_string(),
            vendor: vendor.to_string(),
            product: product.to_string(),
            variant: variant.to_string(),
            ..Default::default()
        })
    }

    /// How urgently the client should upgrade, or `None` when there is
    /// nothing to do (including "not installed yet").
    #[instrument(skip(self, state), fields(client_id = %state.client_id))]
    pub async fn should_upgrade(&self, state: &ClientState) -> CatalogResult<Criticality> {
        self.ensure_valid(state)?;

        let Some(current) = state.current()? else {
            return Ok(Criticality::None);
        };

        let Some(releases) = self.fetch_candidates(state, Some(&current)).await? else {
            return Ok(Criticality::None);
        };

        let step = planner::find_next_upgrade(&releases, &current)?;

        Ok(step.map(|s| s.criticality).unwrap_or_default())
    }

    /// The next single step for the client, or the install step when no
    /// version is installed yet.
    #[instrument(skip(self, state), fields(client_id = %state.client_id))]
    pub async fn find_next_upgrade(&self, state: &ClientState) -> CatalogResult<Option<UpgradeStep>> {
        self.ensure_valid(state)?;

        let Some(releases) = self.fetch_candidates(state, None).await? else {
            return Ok(None);
        };

        let Some(current) = state.current()? else {
            return planner::find_install_version(&releases, state.with_unstable);
        };

        planner::find_next_upgrade(&releases, &current)
    }

    /// The full multi-step path for the client; the install step wraps
    /// into a single-element path when no version is installed yet. The
    /// cancellation token aborts the planner walk between steps.
    #[instrument(skip(self, state, cancel), fields(client_id = %state.client_id))]
    pub async fn find_upgrade_path(
        &self,
        state: &ClientState,
        cancel: &CancelToken,
    ) -> CatalogResult<Option<UpgradePath>> {
        self.ensure_valid(state)?;

        let Some(releases) = self.fetch_candidates(state, None).await? else {
            return Ok(None);
        };

        let Some(current) = state.current()? else {
            let step = planner::find_install_version(&releases, state.with_unstable)?;
            return Ok(step.map(|s| s.to_path()));
        };

        planner::find_upgrade_path(&releases, &current, cancel)
    }

    fn ensure_valid(&self, state: &ClientState) -> CatalogResult<()> {
        if !state.is_valid() {
            return Err(CatalogError::InvalidInput(
                "state is not valid, please register first".to_string(),
            ));
        }

        Ok(())
    }

    async fn active_app(&self, vendor: &str, product: &str) -> CatalogResult<App> {
        let app = self.store.find_app(vendor, product).await?;

        // An inactive app is indistinguishable from a missing one.
        if !app.active {
            return Err(CatalogError::UnknownApp {
                vendor: vendor.to_string(),
                product: product.to_string(),
            });
        }

        Ok(app)
    }

    async fn find_variant(
        &self,
        vendor: &str,
        product: &str,
        name: &str,
    ) -> CatalogResult<Variant> {
        let filter = VariantFilter {
            vendor: vendor.to_string(),
            product: product.to_string(),
            name: name.to_string(),
        };

        self.store
            .list_variants(&filter, 1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| CatalogError::UnknownVariant(name.to_string()))
    }

    /// Fetch the releases this client may see. Returns `None` when the app
    /// or variant is locked, i.e. upgrade answers are withheld.
    async fn fetch_candidates(
        &self,
        state: &ClientState,
        min_version: Option<&Version>,
    ) -> CatalogResult<Option<Vec<Release>>> {
        let app = self.active_app(&state.vendor, &state.product).await?;
        if app.locked {
            debug!(vendor = %state.vendor, product = %state.product, "app is locked");
            return Ok(None);
        }

        if !state.variant.is_empty() {
            let variant = self
                .find_variant(&state.vendor, &state.product, &state.variant)
                .await?;
            if !variant.active || variant.locked {
                debug!(variant = %state.variant, "variant is inactive or locked");
                return Ok(None);
            }
        }

        let mut filter = state.to_filter();
        filter.min_version = min_version.cloned();
        filter.groups = self.resolve_groups(state).await?;

        let releases = self.store.fetch_releases(&filter, 0).await?;

        Ok(Some(releases))
    }

    /// The group audience of the requesting client: its registered groups,
    /// or only public releases when it has none (or is unknown).
    async fn resolve_groups(&self, state: &ClientState) -> CatalogResult<Vec<String>> {
        if let Ok(uuid) = Uuid::parse_str(&state.client_id) {
            if let Some(client) = self.store.find_client(uuid).await? {
                if !client.groups.is_empty() {
                    return Ok(client.groups);
                }
            }
        }

        Ok(vec![PUBLIC_GROUP.to_string()])
    }
}

impl<S: CatalogStore> Clone for CatalogService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}
