//! Route handlers.
//!
//! The upgrade endpoints accept POST only; any other method on a known
//! path answers 400, checked inside the handler so the error body stays
//! uniform.

use crate::dto::{
    ClientStateRequest, RegisterRequest, RegisterResponse, UpgradePathResponse,
    UpgradeStepResponse, Validatable,
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::Method;
use axum::Json;
use serde::de::DeserializeOwned;
use tracing::debug;

pub async fn home() -> &'static str {
    "update catalog"
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn register(
    State(state): State<AppState>,
    method: Method,
    body: Bytes,
) -> ApiResult<Json<RegisterResponse>> {
    let request: RegisterRequest = parse_json_post(&method, &body)?;

    let client_state = state
        .catalog
        .register_client(&request.vendor, &request.product, &request.variant)
        .await?;

    debug!(client_id = %client_state.client_id, "client registered over HTTP");

    Ok(Json(RegisterResponse::from_state(&client_state)))
}

pub async fn upgrade_step(
    State(state): State<AppState>,
    method: Method,
    body: Bytes,
) -> ApiResult<Json<Option<UpgradeStepResponse>>> {
    let request: ClientStateRequest = parse_json_post(&method, &body)?;
    let client_state = request.into_state();

    let step = state.catalog.find_next_upgrade(&client_state).await?;

    Ok(Json(step.as_ref().map(UpgradeStepResponse::from_step)))
}

pub async fn upgrade_path(
    State(state): State<AppState>,
    method: Method,
    body: Bytes,
) -> ApiResult<Json<Option<UpgradePathResponse>>> {
    let request: ClientStateRequest = parse_json_post(&method, &body)?;
    let client_state = request.into_state();

    let path = state
        .catalog
        .find_upgrade_path(&client_state, &state.cancel)
        .await?;

    Ok(Json(path.as_ref().map(UpgradePathResponse::from_path)))
}

/// Enforce POST and unmarshal the body, running the request's own
/// validation afterwards.
fn parse_json_post<T: DeserializeOwned + Validatable>(
    method: &Method,
    body: &Bytes,
) -> ApiResult<T> {
    if method != Method::POST {
        return Err(ApiError::BadRequest(format!(
            "method {method} not allowed"
        )));
    }

    let request: T = serde_json::from_slice(body)
        .map_err(|_| ApiError::BadRequest("error decoding request body".to_string()))?;

    request.validate()?;

    Ok(request)
}
