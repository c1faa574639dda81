//! Release set filtering.

use crate::group::PUBLIC_GROUP;
use crate::release::Release;
use crate::version::Version;
use serde::{Deserialize, Serialize};

/// Narrowing criteria for release fetches.
///
/// Use `min_version == max_version` to hit an exact version. All set bounds
/// conjoin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseFilter {
    pub vendor: String,
    pub product: String,
    pub name: String,
    pub variant: String,
    /// Whether an empty filter variant forces releases with an empty variant
    pub enforce_variant: bool,
    pub os: String,
    pub arch: String,
    pub alias: String,
    pub min_version: Option<Version>,
    pub max_version: Option<Version>,
    /// Like `min_version`, but excluding the bound itself
    pub after_version: Option<Version>,
    /// Like `max_version`, but excluding the bound itself
    pub before_version: Option<Version>,
    pub with_unstable: bool,
    /// Empty means no group restriction; a single `public` entry restricts
    /// to releases without any group binding
    pub groups: Vec<String>,
}

impl ReleaseFilter {
    /// Whether any version bound is set, so callers can skip range checks.
    pub fn filters_versions(&self) -> bool {
        self.min_version.is_some()
            || self.max_version.is_some()
            || self.after_version.is_some()
            || self.before_version.is_some()
    }

    /// Check a version against the configured bounds.
    pub fn match_version(&self, version: &Version) -> bool {
        if let Some(ref min) = self.min_version {
            if min > version {
                return false;
            }
        }

        if let Some(ref after) = self.after_version {
            if after >= version {
                return false;
            }
        }

        if let Some(ref before) = self.before_version {
            if before <= version {
                return false;
            }
        }

        if let Some(ref max) = self.max_version {
            if max < version {
                return false;
            }
        }

        true
    }

    /// The full filter predicate over a single release.
    pub fn matches(&self, release: &Release) -> bool {
        if !self.vendor.is_empty() && release.vendor != self.vendor {
            return false;
        }

        if !self.product.is_empty() && release.product != self.product {
            return false;
        }

        if release.variant != self.variant && (self.enforce_variant || !self.variant.is_empty()) {
            return false;
        }

        if !self.os.is_empty() && release.os != self.os {
            return false;
        }

        if !self.arch.is_empty() && release.arch != self.arch {
            return false;
        }

        if !self.alias.is_empty() && release.alias != self.alias {
            return false;
        }

        if !self.with_unstable && release.unstable {
            return false;
        }

        if self.filters_versions() && !self.match_version(&release.version) {
            return false;
        }

        self.matches_groups(&release.groups)
    }

    /// Group visibility: an empty filter imposes nothing, `["public"]`
    /// admits only unrestricted releases, anything else admits public
    /// releases plus those sharing at least one group.
    pub fn matches_groups(&self, release_groups: &[String]) -> bool {
        if self.groups.is_empty() {
            return true;
        }

        if self.groups.len() == 1 && self.groups[0] == PUBLIC_GROUP {
            return release_groups.is_empty();
        }

        release_groups.is_empty()
            || release_groups.iter().any(|g| self.groups.contains(g))
    }
}

/// Lookup criteria for groups of one app.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupFilter {
    pub vendor: String,
    pub product: String,
    pub name: String,
}

/// Lookup criteria for variants of one app.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantFilter {
    pub vendor: String,
    pub product: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter_with_bounds(
        min: Option<&str>,
        max: Option<&str>,
        after: Option<&str>,
        before: Option<&str>,
    ) -> ReleaseFilter {
        let parse = |s: Option<&str>| s.map(|v| Version::parse(v).unwrap());
        ReleaseFilter {
            min_version: parse(min),
            max_version: parse(max),
            after_version: parse(after),
            before_version: parse(before),
            ..Default::default()
        }
    }

    #[test]
    fn test_filters_versions() {
        assert!(!ReleaseFilter::default().filters_versions());
        assert!(filter_with_bounds(Some("v1.0.0"), None, None, None).filters_versions());
    }

    #[test]
    fn test_inclusive_bounds() {
        let filter = filter_with_bounds(Some("v1.2.0"), Some("v2.0.0"), None, None);
        assert!(!filter.match_version(&Version::new(1, 1, 9)));
        assert!(filter.match_version(&Version::new(1, 2, 0)));
        assert!(filter.match_version(&Version::new(2, 0, 0)));
        assert!(!filter.match_version(&Version::new(2, 0, 1)));
    }

    #[test]
    fn test_exclusive_bounds() {
        let filter = filter_with_bounds(None, None, Some("v1.2.0"), Some("v2.0.0"));
        assert!(!filter.match_version(&Version::new(1, 2, 0)));
        assert!(filter.match_version(&Version::new(1, 2, 1)));
        assert!(!filter.match_version(&Version::new(2, 0, 0)));
    }

    #[test]
    fn test_variant_matching() {
        let mut release = Release::new("acme", "anvil", Version::new(1, 0, 0));
        release.variant = "Pro".into();

        let mut filter = ReleaseFilter {
            vendor: "acme".into(),
            product: "anvil".into(),
            ..Default::default()
        };

        // A lax empty filter variant matches anything.
        assert!(filter.matches(&release));

        // An enforced empty filter variant requires an empty release variant.
        filter.enforce_variant = true;
        assert!(!filter.matches(&release));

        filter.variant = "Pro".into();
        assert!(filter.matches(&release));
    }

    #[test]
    fn test_stability_filtering() {
        let mut release = Release::new("acme", "anvil", Version::new(1, 0, 0));
        release.unstable = true;

        let mut filter = ReleaseFilter::default();
        assert!(!filter.matches(&release));

        filter.with_unstable = true;
        assert!(filter.matches(&release));
    }

    #[test]
    fn test_group_visibility() {
        let public = ReleaseFilter::default();
        assert!(public.matches_groups(&[]));
        assert!(public.matches_groups(&["beta".to_string()]));

        let only_public = ReleaseFilter {
            groups: vec![PUBLIC_GROUP.to_string()],
            ..Default::default()
        };
        assert!(only_public.matches_groups(&[]));
        assert!(!only_public.matches_groups(&["beta".to_string()]));

        let beta = ReleaseFilter {
            groups: vec!["beta".to_string()],
            ..Default::default()
        };
        assert!(beta.matches_groups(&[]));
        assert!(beta.matches_groups(&["beta".to_string(), "staff".to_string()]));
        assert!(!beta.matches_groups(&["staff".to_string()]));
    }
}
