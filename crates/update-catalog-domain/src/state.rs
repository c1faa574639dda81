//! The per-request snapshot of a client's identity and install.

use crate::filter::ReleaseFilter;
use crate::version::Version;
use serde::{Deserialize, Serialize};

/// Transient input to the upgrade queries. Supplied per request, never
/// persisted by the planner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientState {
    #[serde(default)]
    pub client_id: String,
    pub vendor: String,
    pub product: String,
    #[serde(default)]
    pub variant: String,
    /// Optional, e.g. for jars
    #[serde(default)]
    pub os: String,
    #[serde(default)]
    pub arch: String,
    #[serde(default)]
    pub with_unstable: bool,
    #[serde(default)]
    pub current_version: String,
}

impl ClientState {
    /// A state is valid once a registered client identifies itself and its
    /// app.
    pub fn is_valid(&self) -> bool {
        !self.client_id.is_empty() && !self.vendor.is_empty() && !self.product.is_empty()
    }

    pub fn is_installed(&self) -> bool {
        !self.current_version.is_empty()
    }

    /// The canonicalized current version, if any.
    pub fn current(&self) -> Result<Option<Version>, crate::version::VersionError> {
        if self.current_version.is_empty() {
            return Ok(None);
        }

        Version::parse(&self.current_version).map(Some)
    }

    /// The release filter describing what this client may see. Group
    /// restrictions are the caller's concern; the service fills them in
    /// from the registered client.
    pub fn to_filter(&self) -> ReleaseFilter {
        ReleaseFilter {
            vendor: self.vendor.clone(),
            product: self.product.clone(),
            variant: self.variant.clone(),
            enforce_variant: true,
            os: self.os.clone(),
            arch: self.arch.clone(),
            with_unstable: self.with_unstable,
            ..Default::default()
        }
    }
}
