//! App variants (sub-products such as "Pro" or "Light").

use crate::target::UpgradeTarget;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// A named sub-product of an app, keyed by `(vendor, product, name)`.
///
/// The back-reference to the owning app is its lookup key, never an owning
/// reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub vendor: String,
    pub product: String,
    pub name: String,
    /// Whether this variant is handled at all
    pub active: bool,
    /// Whether upgrade answers are served for this variant
    pub locked: bool,
    /// Whether clients may register themselves for this variant
    pub allow_register: bool,
    /// If empty, the upgrade target of the app is used
    pub upgrade_target: UpgradeTarget,
    /// Empty means "default groups of the app"
    pub default_groups: Vec<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Display for Variant {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.vendor, self.product, self.name)
    }
}
