//! JSON request and response shapes.
//!
//! The wire format echoes the model's fields with `date` in RFC3339 and
//! `criticality` as its human string; absent optional fields are omitted.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use update_catalog_domain::{ClientState, Release, UpgradeInfo, UpgradePath, UpgradeStep};

/// Request bodies that carry their own field validation.
pub trait Validatable {
    fn validate(&self) -> Result<(), ApiError>;
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub variant: String,
}

impl Validatable for RegisterRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.vendor.is_empty() || self.product.is_empty() {
            return Err(ApiError::Unprocessable(
                "vendor and product must be given".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub client_id: String,
    pub vendor: String,
    pub product: String,
    pub variant: String,
}

impl RegisterResponse {
    pub fn from_state(state: &ClientState) -> Self {
        Self {
            client_id: state.client_id.clone(),
            vendor: state.vendor.clone(),
            product: state.product.clone(),
            variant: state.variant.clone(),
        }
    }
}

/// The full client state, as posted to the upgrade endpoints.
#[derive(Debug, Deserialize)]
pub struct ClientStateRequest {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub variant: String,
    #[serde(default)]
    pub os: String,
    #[serde(default)]
    pub arch: String,
    #[serde(default)]
    pub with_unstable: bool,
    #[serde(default)]
    pub current_version: String,
}

impl ClientStateRequest {
    pub fn into_state(self) -> ClientState {
        ClientState {
            client_id: self.client_id,
            vendor: self.vendor,
            product: self.product,
            variant: self.variant,
            os: self.os,
            arch: self.arch,
            with_unstable: self.with_unstable,
            current_version: self.current_version,
        }
    }
}

impl Validatable for ClientStateRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.vendor.is_empty() || self.product.is_empty() {
            return Err(ApiError::Unprocessable(
                "vendor and product must be given".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpgradeInfoResponse {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub short_info: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub explanation: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reference_url: String,
}

impl UpgradeInfoResponse {
    fn from_info(info: &UpgradeInfo) -> Self {
        Self {
            short_info: info.short_info.clone(),
            description: info.description.clone(),
            explanation: info.explanation.clone(),
            reference_url: info.reference_url.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReleaseResponse {
    pub vendor: String,
    pub product: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub variant: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub os: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub arch: String,
    /// RFC3339
    pub date: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unstable: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub alias: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub link: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub format: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub signature: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Human string form
    pub criticality: String,
}

impl ReleaseResponse {
    pub fn from_release(release: &Release) -> Self {
        Self {
            vendor: release.vendor.clone(),
            product: release.product.clone(),
            variant: release.variant.clone(),
            description: release.description.clone(),
            os: release.os.clone(),
            arch: release.arch.clone(),
            date: release.date.to_rfc3339(),
            version: release.version.to_string(),
            unstable: release.unstable,
            alias: release.alias.clone(),
            link: release.link.clone(),
            format: release.format.clone(),
            signature: release.signature.clone(),
            tags: release.tags.clone(),
            criticality: release.should_upgrade.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpgradeStepResponse {
    #[serde(default)]
    pub info: UpgradeInfoResponse,
    pub release: ReleaseResponse,
    pub criticality: String,
}

impl UpgradeStepResponse {
    pub fn from_step(step: &UpgradeStep) -> Self {
        Self {
            info: UpgradeInfoResponse::from_info(&step.info),
            release: ReleaseResponse::from_release(&step.release),
            criticality: step.criticality.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpgradePathResponse {
    #[serde(default)]
    pub info: UpgradeInfoResponse,
    pub criticality: String,
    pub steps: Vec<UpgradeStepResponse>,
}

impl UpgradePathResponse {
    pub fn from_path(path: &UpgradePath) -> Self {
        Self {
            info: UpgradeInfoResponse::from_info(&path.info),
            criticality: path.criticality.to_string(),
            steps: path.steps.iter().map(UpgradeStepResponse::from_step).collect(),
        }
    }
}
