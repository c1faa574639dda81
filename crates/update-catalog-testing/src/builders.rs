//! Fluent fixture builders.

use chrono::Utc;
use update_catalog_domain::{App, Criticality, Group, Release, UpgradeTarget, Variant, Version};

/// Build a release fixture step by step.
///
/// ```
/// # use update_catalog_testing::ReleaseBuilder;
/// let release = ReleaseBuilder::new("acme", "anvil", "v1.2.0")
///     .variant("Pro")
///     .target("#.#.*")
///     .unstable()
///     .build();
/// assert_eq!(release.version.to_string(), "v1.2.0");
/// ```
pub struct ReleaseBuilder {
    release: Release,
}

impl ReleaseBuilder {
    pub fn new(vendor: &str, product: &str, version: &str) -> Self {
        let version = Version::parse(version).expect("builder version must parse");
        Self {
            release: Release::new(vendor, product, version),
        }
    }

    pub fn variant(mut self, variant: &str) -> Self {
        self.release.variant = variant.to_string();
        self
    }

    pub fn os(mut self, os: &str) -> Self {
        self.release.os = os.to_string();
        self
    }

    pub fn arch(mut self, arch: &str) -> Self {
        self.release.arch = arch.to_string();
        self
    }

    pub fn alias(mut self, alias: &str) -> Self {
        self.release.alias = alias.to_string();
        self
    }

    pub fn unstable(mut self) -> Self {
        self.release.unstable = true;
        self
    }

    pub fn target(mut self, target: &str) -> Self {
        self.release.upgrade_target = UpgradeTarget::new(target);
        self
    }

    pub fn should_upgrade(mut self, criticality: Criticality) -> Self {
        self.release.should_upgrade = criticality;
        self
    }

    pub fn groups(mut self, groups: &[&str]) -> Self {
        self.release.groups = groups.iter().map(|g| g.to_string()).collect();
        self
    }

    pub fn build(self) -> Release {
        self.release
    }
}

/// A registerable app fixture.
pub fn app(vendor: &str, product: &str) -> App {
    let now = Utc::now();
    App {
        vendor: vendor.to_string(),
        product: product.to_string(),
        name: String::new(),
        active: true,
        locked: false,
        allow_register: true,
        upgrade_target: UpgradeTarget::default(),
        default_groups: Vec::new(),
        created: now,
        updated: now,
    }
}

/// A variant fixture belonging to `app`.
pub fn variant(vendor: &str, product: &str, name: &str) -> Variant {
    let now = Utc::now();
    Variant {
        vendor: vendor.to_string(),
        product: product.to_string(),
        name: name.to_string(),
        active: true,
        locked: false,
        allow_register: true,
        upgrade_target: UpgradeTarget::default(),
        default_groups: Vec::new(),
        created: now,
        updated: now,
    }
}

/// A group fixture belonging to `app`.
pub fn group(vendor: &str, product: &str, name: &str) -> Group {
    let now = Utc::now();
    Group {
        vendor: vendor.to_string(),
        product: product.to_string(),
        name: name.to_string(),
        is_default: false,
        created: now,
        updated: now,
    }
}
