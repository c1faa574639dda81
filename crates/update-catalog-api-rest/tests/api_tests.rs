//! HTTP adapter behavior: status mapping and wire shapes.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;
use update_catalog_api_rest::{create_app, AppState};
use update_catalog_application::{CatalogService, CatalogStore};
use update_catalog_testing::{builders, MemoryCatalogStore, ReleaseBuilder};

async fn test_state() -> AppState {
    let store = Arc::new(MemoryCatalogStore::new());
    store.store_app(&builders::app("acme", "anvil"), false).await.unwrap();

    for version in ["v1.0.0", "v1.0.1", "v1.1.0"] {
        store
            .store_release(&ReleaseBuilder::new("acme", "anvil", version).build(), false)
            .await
            .unwrap();
    }

    AppState::new(Arc::new(CatalogService::new(store)))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn register_round_trip() {
    let app = create_app(test_state().await);

    let response = app
        .oneshot(post(
            "/register",
            serde_json::json!({"vendor": "acme", "product": "anvil", "variant": ""}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["vendor"], "acme");
    assert_eq!(body["product"], "anvil");
    assert!(!body["client_id"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn register_requires_vendor_and_product() {
    let app = create_app(test_state().await);

    let response = app
        .oneshot(post("/register", serde_json::json!({"vendor": "acme"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let app = create_app(test_state().await);
    let response = app
        .oneshot(post(
            "/register",
            serde_json::json!({"vendor": "acme", "product": ""}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn register_rejects_unknown_apps() {
    let app = create_app(test_state().await);

    let response = app
        .oneshot(post(
            "/register",
            serde_json::json!({"vendor": "acme", "product": "dynamite"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"], "UNKNOWN_APP");
}

#[tokio::test]
async fn method_mismatch_answers_400() {
    let app = create_app(test_state().await);

    let request = Request::builder()
        .method("GET")
        .uri("/register")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upgrade_step_returns_the_install_release() {
    let state = test_state().await;
    let app = create_app(state.clone());

    // Register first so the upgrade query carries a known client id.
    let response = app
        .oneshot(post(
            "/register",
            serde_json::json!({"vendor": "acme", "product": "anvil"}),
        ))
        .await
        .unwrap();
    let client_id = body_json(response).await["client_id"]
        .as_str()
        .unwrap()
        .to_string();

    let app = create_app(state);
    let response = app
        .oneshot(post(
            "/upgrade/step",
            serde_json::json!({
                "client_id": client_id,
                "vendor": "acme",
                "product": "anvil",
                "variant": "",
                "os": "",
                "arch": "",
                "with_unstable": false,
                "current_version": ""
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["release"]["version"], "v1.1.0");
    assert_eq!(body["criticality"], "None");
    assert_eq!(body["release"]["criticality"], "None");
    assert!(body["release"]["date"].as_str().is_some());
}

#[tokio::test]
async fn upgrade_step_with_current_version_steps_forward() {
    let state = test_state().await;

    let app = create_app(state.clone());
    let response = app
        .oneshot(post(
            "/register",
            serde_json::json!({"vendor": "acme", "product": "anvil"}),
        ))
        .await
        .unwrap();
    let client_id = body_json(response).await["client_id"]
        .as_str()
        .unwrap()
        .to_string();

    let app = create_app(state);
    let response = app
        .oneshot(post(
            "/upgrade/step",
            serde_json::json!({
                "client_id": client_id,
                "vendor": "acme",
                "product": "anvil",
                "current_version": "v1.0.0"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["release"]["version"], "v1.1.0");
    assert_eq!(body["criticality"], "Recommended");
}

#[tokio::test]
async fn upgrade_path_walks_all_steps() {
    let state = test_state().await;

    let app = create_app(state.clone());
    let response = app
        .oneshot(post(
            "/register",
            serde_json::json!({"vendor": "acme", "product": "anvil"}),
        ))
        .await
        .unwrap();
    let client_id = body_json(response).await["client_id"]
        .as_str()
        .unwrap()
        .to_string();

    let app = create_app(state);
    let response = app
        .oneshot(post(
            "/upgrade/path",
            serde_json::json!({
                "client_id": client_id,
                "vendor": "acme",
                "product": "anvil",
                "current_version": "v1.0.0"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let steps = body["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0]["release"]["version"], "v1.1.0");
    assert_eq!(body["criticality"], "Recommended");
}

#[tokio::test]
async fn cancelled_state_answers_499_on_path_queries() {
    let state = test_state().await;

    let app = create_app(state.clone());
    let response = app
        .oneshot(post(
            "/register",
            serde_json::json!({"vendor": "acme", "product": "anvil"}),
        ))
        .await
        .unwrap();
    let client_id = body_json(response).await["client_id"]
        .as_str()
        .unwrap()
        .to_string();

    state.cancel.cancel();

    let app = create_app(state);
    let response = app
        .oneshot(post(
            "/upgrade/path",
            serde_json::json!({
                "client_id": client_id,
                "vendor": "acme",
                "product": "anvil",
                "current_version": "v1.0.0"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 499);
}

#[tokio::test]
async fn upgrade_step_without_registration_is_invalid() {
    let app = create_app(test_state().await);

    let response = app
        .oneshot(post(
            "/upgrade/step",
            serde_json::json!({"vendor": "acme", "product": "anvil"}),
        ))
        .await
        .unwrap();

    // Valid body, but the empty client id fails the service's state check.
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn malformed_body_answers_400() {
    let app = create_app(test_state().await);

    let request = Request::builder()
        .method("POST")
        .uri("/upgrade/step")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_endpoint_answers() {
    let app = create_app(test_state().await);

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
