//! Published builds.

use crate::criticality::Criticality;
use crate::target::UpgradeTarget;
use crate::version::Version;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// A published build of an app.
///
/// Key identity is `(vendor, product, variant, os, arch, version)`. Group
/// bindings are carried as plain names at the planner boundary; the store
/// hydrates the linkage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub vendor: String,
    pub product: String,
    /// App display name, if known
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub variant: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub os: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub arch: String,
    pub date: DateTime<Utc>,
    pub version: Version,
    #[serde(default)]
    pub unstable: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub alias: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub link: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub format: String,
    /// A cryptographical representation (hash etc.)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub signature: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// If empty, the default upgrade target is used
    #[serde(default, skip_serializing_if = "UpgradeTarget::is_empty")]
    pub upgrade_target: UpgradeTarget,
    /// Authored criticality floor for upgrades away from this release
    #[serde(default)]
    pub should_upgrade: Criticality,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
}

impl Release {
    pub fn new(vendor: impl Into<String>, product: impl Into<String>, version: Version) -> Self {
        Self {
            vendor: vendor.into(),
            product: product.into(),
            name: String::new(),
            variant: String::new(),
            description: String::new(),
            os: String::new(),
            arch: String::new(),
            date: Utc::now(),
            version,
            unstable: false,
            alias: String::new(),
            link: String::new(),
            format: String::new(),
            signature: String::new(),
            tags: Vec::new(),
            upgrade_target: UpgradeTarget::default(),
            should_upgrade: Criticality::None,
            groups: Vec::new(),
        }
    }
}

impl Display for Release {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.vendor, self.product)?;
        if !self.variant.is_empty() {
            write!(f, " {}", self.variant)?;
        }
        write!(f, " {}", self.version)?;
        if !self.os.is_empty() || !self.arch.is_empty() {
            write!(f, " ({}/{})", self.os, self.arch)?;
        }
        if self.unstable {
            f.write_str(" [unstable]")?;
        }
        Ok(())
    }
}

/// The full release history of one app.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseHistory {
    pub vendor: String,
    pub product: String,
    pub releases: Vec<Release>,
}
