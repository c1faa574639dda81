//! Registered applications.

use crate::target::UpgradeTarget;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// An installable product, keyed by `(vendor, product)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct App {
    /// Must be present and match a client's installation
    pub vendor: String,
    /// Must be present and match a client's installation
    pub product: String,
    /// For printing; if not given, "<vendor> <product>" is used
    pub name: String,
    /// Whether this app is handled at all
    pub active: bool,
    /// Whether upgrade answers are served for this app
    pub locked: bool,
    /// Whether clients may register themselves
    pub allow_register: bool,
    /// If empty, the system default upgrade target is used
    pub upgrade_target: UpgradeTarget,
    /// Groups that releases inherit when published without an explicit list
    pub default_groups: Vec<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Display for App {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if !self.name.is_empty() {
            return f.write_str(&self.name);
        }

        write!(f, "{} {}", self.vendor, self.product)
    }
}
