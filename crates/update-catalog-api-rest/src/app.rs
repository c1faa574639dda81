//! Router assembly and the serve loop.

use crate::routes;
use crate::state::AppState;
use axum::routing::{any, get};
use axum::Router;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

/// Build the catalog router over the given state.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::home))
        .route("/health", get(routes::health))
        .route("/register", any(routes::register))
        .route("/upgrade/step", any(routes::upgrade_step))
        .route("/upgrade/path", any(routes::upgrade_path))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(Duration::from_secs(30))),
        )
}

/// Bind the listener and serve until shutdown.
///
/// A shutdown signal trips the state's cancellation token, so in-flight
/// planner walks abort instead of running to completion.
pub async fn serve(state: AppState, port: u16) -> anyhow::Result<()> {
    let cancel = state.cancel.clone();
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "serving HTTP catalog API");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
            cancel.cancel();
        })
        .await?;

    Ok(())
}
