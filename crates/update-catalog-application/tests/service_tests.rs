//! Catalog service behavior over the in-memory store.

use std::sync::Arc;
use update_catalog_application::{CatalogService, CatalogStore};
use update_catalog_domain::{
    CancelToken, CatalogError, ClientState, Criticality, UpgradeTarget, Version,
};
use update_catalog_testing::{builders, MemoryCatalogStore, ReleaseBuilder};

async fn service_with_history() -> CatalogService<MemoryCatalogStore> {
    let store = Arc::new(MemoryCatalogStore::new());
    store.store_app(&builders::app("acme", "anvil"), false).await.unwrap();

    for (version, target) in [
        ("v1.0.0", ""),
        ("v1.0.1", ""),
        ("v1.1.0", "#.#.*"),
        ("v1.1.1", ""),
        ("v1.2.0", ""),
        ("v2.0.0", ""),
    ] {
        let release = ReleaseBuilder::new("acme", "anvil", version)
            .target(target)
            .build();
        store.store_release(&release, false).await.unwrap();
    }

    CatalogService::new(store)
}

fn state(client_id: &str, current_version: &str) -> ClientState {
    ClientState {
        client_id: client_id.to_string(),
        vendor: "acme".to_string(),
        product: "anvil".to_string(),
        current_version: current_version.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn register_client_returns_a_fresh_state() {
    let service = service_with_history().await;

    let state = service.register_client("acme", "anvil", "").await.unwrap();
    assert!(!state.client_id.is_empty());
    assert_eq!(state.vendor, "acme");
    assert_eq!(state.product, "anvil");

    let uuid = uuid::Uuid::parse_str(&state.client_id).unwrap();
    let client = service.store().find_client(uuid).await.unwrap().unwrap();
    assert_eq!(client.vendor, "acme");
}

#[tokio::test]
async fn register_client_rejects_unknown_apps() {
    let service = service_with_history().await;

    let result = service.register_client("acme", "dynamite", "").await;
    assert!(matches!(result, Err(CatalogError::UnknownApp { .. })));
}

#[tokio::test]
async fn register_client_honors_allow_register() {
    let store = Arc::new(MemoryCatalogStore::new());
    let mut app = builders::app("acme", "anvil");
    app.allow_register = false;
    store.store_app(&app, false).await.unwrap();

    let service = CatalogService::new(store);
    let result = service.register_client("acme", "anvil", "").await;
    assert!(matches!(result, Err(CatalogError::RegistrationForbidden)));
}

#[tokio::test]
async fn register_client_honors_variant_allow_register() {
    let store = Arc::new(MemoryCatalogStore::new());
    store.store_app(&builders::app("acme", "anvil"), false).await.unwrap();

    let mut pro = builders::variant("acme", "anvil", "Pro");
    pro.allow_register = false;
    store.store_variant(&pro, false).await.unwrap();

    let service = CatalogService::new(store);

    let result = service.register_client("acme", "anvil", "Pro").await;
    assert!(matches!(result, Err(CatalogError::RegistrationForbidden)));

    let result = service.register_client("acme", "anvil", "Light").await;
    assert!(matches!(result, Err(CatalogError::UnknownVariant(_))));
}

#[tokio::test]
async fn should_upgrade_without_install_is_none() {
    let service = service_with_history().await;
    let registered = service.register_client("acme", "anvil", "").await.unwrap();

    let criticality = service
        .should_upgrade(&state(&registered.client_id, ""))
        .await
        .unwrap();
    assert_eq!(criticality, Criticality::None);
}

#[tokio::test]
async fn should_upgrade_reports_the_step_criticality() {
    let service = service_with_history().await;
    let registered = service.register_client("acme", "anvil", "").await.unwrap();

    // v1.1.0 -> v1.1.1 is a patch hop
    let criticality = service
        .should_upgrade(&state(&registered.client_id, "v1.1.0"))
        .await
        .unwrap();
    assert_eq!(criticality, Criticality::Possible);

    // v1.2.0 -> v2.0.0 crosses a major
    let criticality = service
        .should_upgrade(&state(&registered.client_id, "v1.2.0"))
        .await
        .unwrap();
    assert_eq!(criticality, Criticality::StronglyRecommended);
}

#[tokio::test]
async fn invalid_state_is_rejected() {
    let service = service_with_history().await;

    let result = service.should_upgrade(&state("", "v1.0.0")).await;
    assert!(matches!(result, Err(CatalogError::InvalidInput(_))));
}

#[tokio::test]
async fn find_next_upgrade_installs_when_nothing_is_installed() {
    let service = service_with_history().await;
    let registered = service.register_client("acme", "anvil", "").await.unwrap();

    let step = service
        .find_next_upgrade(&state(&registered.client_id, ""))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(step.release.version, Version::new(2, 0, 0));
    assert_eq!(step.criticality, Criticality::None);
}

#[tokio::test]
async fn find_upgrade_path_wraps_the_install_step() {
    let service = service_with_history().await;
    let registered = service.register_client("acme", "anvil", "").await.unwrap();

    let path = service
        .find_upgrade_path(&state(&registered.client_id, ""), &CancelToken::new())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(path.steps.len(), 1);
    assert_eq!(path.steps[0].release.version, Version::new(2, 0, 0));
}

#[tokio::test]
async fn find_upgrade_path_walks_to_the_end() {
    let service = service_with_history().await;
    let registered = service.register_client("acme", "anvil", "").await.unwrap();

    let path = service
        .find_upgrade_path(&state(&registered.client_id, "v1.0.0"), &CancelToken::new())
        .await
        .unwrap()
        .unwrap();

    let versions: Vec<String> = path
        .steps
        .iter()
        .map(|s| s.release.version.to_string())
        .collect();
    assert_eq!(versions, vec!["v1.1.1", "v1.2.0", "v2.0.0"]);
}

#[tokio::test]
async fn find_upgrade_path_honors_cancellation() {
    let service = service_with_history().await;
    let registered = service.register_client("acme", "anvil", "").await.unwrap();

    let token = CancelToken::new();
    token.cancel();

    let result = service
        .find_upgrade_path(&state(&registered.client_id, "v1.0.0"), &token)
        .await;
    assert!(matches!(result, Err(CatalogError::Cancelled)));
}

#[tokio::test]
async fn locked_apps_withhold_upgrade_answers() {
    let store = Arc::new(MemoryCatalogStore::new());
    let mut app = builders::app("acme", "anvil");
    app.locked = true;
    store.store_app(&app, false).await.unwrap();
    store
        .store_release(
            &ReleaseBuilder::new("acme", "anvil", "v1.0.0").build(),
            false,
        )
        .await
        .unwrap();

    let service = CatalogService::new(store);
    let registered = service.register_client("acme", "anvil", "").await.unwrap();

    let step = service
        .find_next_upgrade(&state(&registered.client_id, ""))
        .await
        .unwrap();
    assert!(step.is_none());
}

#[tokio::test]
async fn group_bound_releases_stay_invisible_to_public_clients() {
    let store = Arc::new(MemoryCatalogStore::new());
    store.store_app(&builders::app("acme", "anvil"), false).await.unwrap();
    store
        .store_group(&builders::group("acme", "anvil", "beta"), false)
        .await
        .unwrap();

    store
        .store_release(
            &ReleaseBuilder::new("acme", "anvil", "v1.0.0").build(),
            false,
        )
        .await
        .unwrap();
    store
        .store_release(
            &ReleaseBuilder::new("acme", "anvil", "v1.1.0")
                .groups(&["beta"])
                .build(),
            false,
        )
        .await
        .unwrap();

    let service = CatalogService::new(Arc::clone(&store));
    let registered = service.register_client("acme", "anvil", "").await.unwrap();

    // The public client only sees v1.0.0.
    let step = service
        .find_next_upgrade(&state(&registered.client_id, ""))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(step.release.version, Version::new(1, 0, 0));

    // A beta client sees the group-bound release too.
    let app = store.find_app("acme", "anvil").await.unwrap();
    let beta_client = store
        .register_client(&app, "", &["beta".to_string()])
        .await
        .unwrap();

    let step = service
        .find_next_upgrade(&state(&beta_client.uuid.to_string(), ""))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(step.release.version, Version::new(1, 1, 0));
}

#[tokio::test]
async fn store_validates_upgrade_targets_before_persisting() {
    let store = Arc::new(MemoryCatalogStore::new());
    store.store_app(&builders::app("acme", "anvil"), false).await.unwrap();
    store
        .store_release(
            &ReleaseBuilder::new("acme", "anvil", "v1.0.0").build(),
            false,
        )
        .await
        .unwrap();

    let filter = update_catalog_domain::ReleaseFilter {
        vendor: "acme".to_string(),
        product: "anvil".to_string(),
        ..Default::default()
    };

    let result = store
        .set_upgrade_target(&filter, &UpgradeTarget::new("not-a-target"))
        .await;
    assert!(result.is_err());

    let updated = store
        .set_upgrade_target(&filter, &UpgradeTarget::new("#.#.*"))
        .await
        .unwrap();
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].upgrade_target, UpgradeTarget::new("#.#.*"));
}
