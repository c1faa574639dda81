//! HTTP client for the catalog server.

use crate::state::State;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub vendor: String,
    pub product: String,
    pub variant: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterResponse {
    pub client_id: String,
    pub vendor: String,
    pub product: String,
    pub variant: String,
}

#[derive(Debug, Serialize)]
pub struct ClientStateRequest {
    pub client_id: String,
    pub vendor: String,
    pub product: String,
    pub variant: String,
    pub os: String,
    pub arch: String,
    pub with_unstable: bool,
    pub current_version: String,
}

impl ClientStateRequest {
    pub fn from_state(state: &State) -> Self {
        Self {
            client_id: state.client_id.clone(),
            vendor: state.vendor.clone(),
            product: state.product.clone(),
            variant: state.variant.clone(),
            os: state.os.clone(),
            arch: state.arch.clone(),
            with_unstable: state.with_unstable,
            current_version: state.version.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReleaseResponse {
    pub vendor: String,
    pub product: String,
    #[serde(default)]
    pub variant: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub os: String,
    #[serde(default)]
    pub arch: String,
    pub date: String,
    pub version: String,
    #[serde(default)]
    pub unstable: bool,
    #[serde(default)]
    pub alias: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub signature: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub criticality: String,
}

#[derive(Debug, Deserialize)]
pub struct UpgradeStepResponse {
    pub release: ReleaseResponse,
    pub criticality: String,
}

/// Thin JSON client over the two catalog endpoints.
pub struct CatalogClient {
    base_url: String,
    http: reqwest::Client,
}

impl CatalogClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse> {
        let response = self
            .http
            .post(format!("{}/register", self.base_url))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            return Err(anyhow!("error registering client: {status}: {message}"));
        }

        Ok(response.json().await?)
    }

    /// Ask the server for the next upgrade step. `None` means the
    /// installation is up to date.
    pub async fn upgrade_step(
        &self,
        request: &ClientStateRequest,
    ) -> Result<Option<UpgradeStepResponse>> {
        let response = self
            .http
            .post(format!("{}/upgrade/step", self.base_url))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            return Err(anyhow!("error finding next upgrade: {status}: {message}"));
        }

        Ok(response.json().await?)
    }
}
