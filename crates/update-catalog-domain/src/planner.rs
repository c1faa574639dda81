//! The upgrade planner.
//!
//! All planner functions are pure over their inputs: a candidate release
//! slice, a current version and the targets authored on the releases. The
//! caller must pass a candidate set that already respects variant, OS,
//! arch, stability and group constraints for the requesting client; the
//! planner does not re-apply those.

use crate::cancel::CancelToken;
use crate::criticality::Criticality;
use crate::errors::{CatalogError, CatalogResult};
use crate::release::Release;
use crate::target::{find_target_version, UpgradeTarget, ONLY_PATCHES};
use crate::version::Version;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Human-facing details attached to a step or path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeInfo {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub short_info: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub explanation: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reference_url: String,
}

/// One chosen release plus info and criticality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeStep {
    pub info: UpgradeInfo,
    pub release: Release,
    pub criticality: Criticality,
}

impl UpgradeStep {
    /// Wrap a single step (typically an install step) into a path.
    pub fn to_path(&self) -> UpgradePath {
        UpgradePath {
            info: self.info.clone(),
            criticality: self.criticality,
            steps: vec![self.clone()],
        }
    }
}

/// An ordered sequence of steps from current to final.
///
/// The path-level criticality and info mirror the first step: the
/// immediate action dominates user messaging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradePath {
    pub info: UpgradeInfo,
    pub criticality: Criticality,
    pub steps: Vec<UpgradeStep>,
}

/// Pick the newest release, or the newest stable one when unstable builds
/// are not wanted. Returns `None` for an empty set, or when everything is
/// unstable and `with_unstable` is off.
pub fn find_install_version(
    releases: &[Release],
    with_unstable: bool,
) -> CatalogResult<Option<UpgradeStep>> {
    if releases.is_empty() {
        return Ok(None);
    }

    let (map, versions) = release_map(releases);

    for version in versions.iter().rev() {
        let release = &map[version];
        if !with_unstable && release.unstable {
            continue;
        }

        return Ok(Some(UpgradeStep {
            info: UpgradeInfo::default(),
            release: release.clone(),
            criticality: Criticality::None,
        }));
    }

    // everything unstable or nothing released yet
    Ok(None)
}

/// Resolve the single next step away from the current version.
///
/// The effective target is the current release's own target; an empty one
/// evaluates as the system default. Unless the target carries the
/// `nopatches:` modifier, a fruitless evaluation retries once with the
/// latest-patch target.
pub fn find_next_upgrade(
    releases: &[Release],
    current: &Version,
) -> CatalogResult<Option<UpgradeStep>> {
    let (map, versions) = release_map(releases);

    let current_release = map.get(current).ok_or_else(|| {
        CatalogError::Planner(format!(
            "current version {current} not found in available releases"
        ))
    })?;

    let (search_patches, target) = current_release.upgrade_target.without_modifier();

    let mut target_version = find_target_version(&versions, current, &target)?;

    if target_version.is_none() {
        if !search_patches {
            return Ok(None);
        }

        target_version =
            find_target_version(&versions, current, &UpgradeTarget::new(ONLY_PATCHES))?;
    }

    let Some(target_version) = target_version else {
        // nothing new in town
        return Ok(None);
    };

    let target_release = map.get(&target_version).ok_or_else(|| {
        CatalogError::Planner(format!(
            "target version {target_version} not found in available releases"
        ))
    })?;

    let mut criticality = default_criticality(current, &target_version);
    if current_release.should_upgrade > criticality {
        criticality = current_release.should_upgrade;
    }

    Ok(Some(UpgradeStep {
        info: UpgradeInfo::default(),
        release: target_release.clone(),
        criticality,
    }))
}

/// Chain [`find_next_upgrade`] until nothing newer remains.
///
/// Each step must yield a strictly greater version, which guarantees
/// termination without an explicit cycle guard. The cancellation token is
/// checked between successive iterations; a tripped token aborts the walk
/// with [`CatalogError::Cancelled`].
pub fn find_upgrade_path(
    releases: &[Release],
    current: &Version,
    cancel: &CancelToken,
) -> CatalogResult<Option<UpgradePath>> {
    // reserve spots for patch, minor and major
    let mut steps: Vec<UpgradeStep> = Vec::with_capacity(4);
    let mut cursor = current.clone();

    loop {
        if cancel.is_cancelled() {
            return Err(CatalogError::Cancelled);
        }

        match find_next_upgrade(releases, &cursor)? {
            Some(step) => {
                cursor = step.release.version.clone();
                steps.push(step);
            }
            None => {
                if steps.is_empty() {
                    return Ok(None);
                }

                // summary = whatever the first step dictates
                let info = steps[0].info.clone();
                let criticality = steps[0].criticality;

                return Ok(Some(UpgradePath {
                    info,
                    criticality,
                    steps,
                }));
            }
        }
    }
}

/// Build the version index and the ascending version list. Later
/// duplicates of a version shadow earlier ones.
fn release_map(releases: &[Release]) -> (BTreeMap<Version, Release>, Vec<Version>) {
    let mut map = BTreeMap::new();
    for release in releases {
        map.insert(release.version.clone(), release.clone());
    }

    let versions: Vec<Version> = map.keys().cloned().collect();

    (map, versions)
}

/// Criticality from the size of the version jump alone.
fn default_criticality(current: &Version, target: &Version) -> Criticality {
    if current.major != target.major {
        return Criticality::StronglyRecommended;
    }

    if current.minor != target.minor {
        return Criticality::Recommended;
    }

    Criticality::Possible
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release(version: &str, target: &str) -> Release {
        let mut release = Release::new("acme", "anvil", Version::parse(version).unwrap());
        release.upgrade_target = UpgradeTarget::new(target);
        release
    }

    fn history() -> Vec<Release> {
        vec![
            release("v1.0.0", "#.+2.*"),
            release("v1.0.1", ""),
            release("v1.1.0", "#.#.*"),
            release("v1.1.1", "#.#.*"),
            release("v1.2.0", "#.+c.*"),
            release("v1.2.1", ""),
            release("v1.2.2", ""),
            release("v1.3.0", "1.8.*"),
            release("v1.4.0", "#.+e._"),
            release("v1.5.0", "1.9.*"),
            release("v1.7.0", "v2.1.0"),
            release("v1.7.1", ""),
            release("v1.8.0", ""),
            release("v1.8.1", ""),
            release("v2.0.0", ""),
            release("v2.0.1", ""),
            release("v2.0.2", ""),
            release("v2.1.0", "#.+c.*"),
            release("v2.2.0", ""),
            release("v2.3.0", ""),
            release("v2.3.1", "#.#.*"),
            release("v2.3.2", ""),
        ]
    }

    fn next_version(releases: &[Release], current: &str) -> Option<String> {
        find_next_upgrade(releases, &Version::parse(current).unwrap())
            .unwrap()
            .map(|step| step.release.version.to_string())
    }

    #[test]
    fn test_find_next_upgrade_scenarios() {
        let releases = history();

        let cases = [
            ("Simple patch upgrade 1", "v2.3.1", Some("v2.3.2")),
            ("Simple patch upgrade 2", "v1.1.0", Some("v1.1.1")),
            ("Already at latest patch", "v1.1.1", None),
            ("Default upgrade: minor", "v1.7.1", Some("v1.8.1")),
            ("Default upgrade: major", "v1.8.0", Some("v2.0.2")),
            ("Default upgrade: none available", "v2.3.2", None),
            ("Next even minor", "v1.4.0", Some("v1.8.0")),
            ("Next minor matching current even", "v1.2.0", Some("v1.4.0")),
            ("Next minor matching current odd", "v2.1.0", Some("v2.3.2")),
            ("Exact minor", "v1.3.0", Some("v1.8.1")),
            ("Unavailable exact minor", "v1.5.0", None),
            ("2 minor steps", "v1.0.0", Some("v1.2.2")),
        ];

        for (name, current, expected) in cases {
            assert_eq!(
                next_version(&releases, current),
                expected.map(str::to_string),
                "{name}"
            );
        }
    }

    #[test]
    fn test_find_next_upgrade_works_without_leading_v() {
        let releases = vec![release("1.1.0", ""), release("1.1.1", "")];
        assert_eq!(
            next_version(&releases, "1.1.0"),
            Some("v1.1.1".to_string())
        );
    }

    #[test]
    fn test_nopatches_suppresses_fallback() {
        let releases = vec![release("1.1.0", "nopatches:"), release("1.1.1", "")];
        assert_eq!(next_version(&releases, "1.1.0"), None);
    }

    #[test]
    fn test_unknown_current_version_fails() {
        let releases = vec![release("v1.0.0", "")];
        let result = find_next_upgrade(&releases, &Version::new(0, 9, 0));
        assert!(matches!(result, Err(CatalogError::Planner(_))));
    }

    #[test]
    fn test_criticality_by_jump_size() {
        let releases = vec![
            release("v1.0.0", ""),
            release("v1.0.1", ""),
            release("v1.1.0", ""),
            release("v2.0.0", ""),
        ];

        let step = find_next_upgrade(&releases, &Version::new(1, 0, 0))
            .unwrap()
            .unwrap();
        // default target: latest minor of the current major first
        assert_eq!(step.release.version, Version::new(1, 1, 0));
        assert_eq!(step.criticality, Criticality::Recommended);

        let step = find_next_upgrade(&releases, &Version::new(1, 1, 0))
            .unwrap()
            .unwrap();
        assert_eq!(step.release.version, Version::new(2, 0, 0));
        assert_eq!(step.criticality, Criticality::StronglyRecommended);

        let step = find_next_upgrade(&releases, &Version::new(1, 0, 1))
            .unwrap()
            .unwrap();
        assert_eq!(step.release.version, Version::new(1, 1, 0));
        assert_eq!(step.criticality, Criticality::Recommended);
    }

    #[test]
    fn test_authored_criticality_raises_the_floor() {
        let mut current = release("v1.1.0", "#.#.*");
        current.should_upgrade = Criticality::Critical;
        let releases = vec![current, release("v1.1.1", "")];

        let step = find_next_upgrade(&releases, &Version::new(1, 1, 0))
            .unwrap()
            .unwrap();
        assert_eq!(step.criticality, Criticality::Critical);
    }

    #[test]
    fn test_exceptional_never_lowers_derived_criticality() {
        let mut current = release("v1.1.0", "#.#.*");
        current.should_upgrade = Criticality::Exceptional;
        let releases = vec![current, release("v1.1.1", "")];

        let step = find_next_upgrade(&releases, &Version::new(1, 1, 0))
            .unwrap()
            .unwrap();
        assert_eq!(step.criticality, Criticality::Possible);
    }

    #[test]
    fn test_find_upgrade_path_scenarios() {
        let releases = history();

        let cases: [(&str, &str, &[&str], Criticality); 8] = [
            ("Simple patch upgrade 1", "v2.3.1", &["v2.3.2"], Criticality::Possible),
            ("Simple patch upgrade 2", "v1.1.0", &["v1.1.1"], Criticality::Possible),
            ("Already at latest patch", "v1.1.1", &[], Criticality::None),
            (
                "Default upgrade: minor",
                "v1.7.1",
                &["v1.8.1", "v2.0.2", "v2.1.0", "v2.3.2"],
                Criticality::Recommended,
            ),
            ("Default upgrade: none available", "v2.3.2", &[], Criticality::None),
            (
                "Next even minor",
                "v1.4.0",
                &["v1.8.0", "v2.0.2", "v2.1.0", "v2.3.2"],
                Criticality::Recommended,
            ),
            (
                "Next minor matching current odd",
                "v2.1.0",
                &["v2.3.2"],
                Criticality::Recommended,
            ),
            ("Unavailable exact minor", "v1.5.0", &[], Criticality::None),
        ];

        for (name, current, expected_versions, expected_criticality) in cases {
            let path = find_upgrade_path(
                &releases,
                &Version::parse(current).unwrap(),
                &CancelToken::new(),
            )
            .unwrap();

            let versions: Vec<String> = path
                .as_ref()
                .map(|p| p.steps.iter().map(|s| s.release.version.to_string()).collect())
                .unwrap_or_default();
            let criticality = path.map(|p| p.criticality).unwrap_or_default();

            assert_eq!(versions, expected_versions.to_vec(), "{name}");
            assert_eq!(criticality, expected_criticality, "{name}");
        }
    }

    #[test]
    fn test_path_first_step_matches_next_upgrade() {
        let releases = history();
        let current = Version::parse("v1.7.1").unwrap();

        let step = find_next_upgrade(&releases, &current).unwrap().unwrap();
        let path = find_upgrade_path(&releases, &current, &CancelToken::new())
            .unwrap()
            .unwrap();

        assert_eq!(path.steps[0].release.version, step.release.version);
        assert_eq!(path.steps[0].criticality, step.criticality);
        assert_eq!(path.criticality, path.steps[0].criticality);
    }

    #[test]
    fn test_cancelled_token_aborts_the_path() {
        let releases = history();
        let token = CancelToken::new();
        token.cancel();

        let result = find_upgrade_path(
            &releases,
            &Version::parse("v1.7.1").unwrap(),
            &token,
        );
        assert!(matches!(result, Err(CatalogError::Cancelled)));
    }

    #[test]
    fn test_find_install_version() {
        let mut releases = vec![
            release("v1.0.0", ""),
            release("v1.0.1", ""),
            release("v1.1.0", ""),
            release("v1.1.1", ""),
            release("v1.2.0", ""),
            release("v1.2.1", ""),
            release("v1.2.2", ""),
        ];
        releases[0].unstable = true;
        releases[1].unstable = true;
        releases[6].unstable = true;

        let stable = find_install_version(&releases, false).unwrap().unwrap();
        assert_eq!(stable.release.version, Version::new(1, 2, 1));
        assert_eq!(stable.criticality, Criticality::None);

        let any = find_install_version(&releases, true).unwrap().unwrap();
        assert_eq!(any.release.version, Version::new(1, 2, 2));
    }

    #[test]
    fn test_find_install_version_all_unstable() {
        let mut releases = vec![
            release("v1.0.0", ""),
            release("v1.0.1", ""),
            release("v1.1.0", ""),
        ];
        for r in &mut releases {
            r.unstable = true;
        }

        assert!(find_install_version(&releases, false).unwrap().is_none());
        assert!(find_install_version(&[], true).unwrap().is_none());
    }

    #[test]
    fn test_find_install_version_single_release() {
        // the whole sorted range is eligible, including the very first entry
        let releases = vec![release("v1.0.0", "")];
        let step = find_install_version(&releases, false).unwrap().unwrap();
        assert_eq!(step.release.version, Version::new(1, 0, 0));
    }

    #[test]
    fn test_install_step_to_path() {
        let releases = vec![release("v1.0.0", "")];
        let step = find_install_version(&releases, true).unwrap().unwrap();
        let path = step.to_path();

        assert_eq!(path.steps.len(), 1);
        assert_eq!(path.criticality, step.criticality);
    }
}
