//! Property-based invariants of the upgrade planner.

use proptest::prelude::*;
use update_catalog_domain::{
    find_install_version, find_next_upgrade, find_upgrade_path, CancelToken, Criticality,
    Release, UpgradeTarget, Version,
};

fn target_pool() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("#.#.*".to_string()),
        Just("#.+.*".to_string()),
        Just("#.*.*".to_string()),
        Just("*.*.*".to_string()),
        Just("#.+c.*".to_string()),
        Just("#.+e._".to_string()),
        Just("#.+2.*".to_string()),
        Just("+._.*".to_string()),
        Just("nopatches:".to_string()),
        Just("nopatches:+._.*".to_string()),
    ]
}

/// Release histories with distinct version triples and arbitrary targets,
/// stability flags and authored criticalities.
fn release_set() -> impl Strategy<Value = Vec<Release>> {
    proptest::collection::btree_set((0u64..3, 0u64..4, 0u64..4), 1..16)
        .prop_flat_map(|triples| {
            let count = triples.len();
            (
                Just(triples),
                proptest::collection::vec((target_pool(), any::<bool>(), -1i16..6), count),
            )
        })
        .prop_map(|(triples, extras)| {
            triples
                .into_iter()
                .zip(extras)
                .map(|((major, minor, patch), (target, unstable, level))| {
                    let mut release =
                        Release::new("acme", "anvil", Version::new(major, minor, patch));
                    release.upgrade_target = UpgradeTarget::new(target);
                    release.unstable = unstable;
                    release.should_upgrade = Criticality::from_level(level).unwrap();
                    release
                })
                .collect()
        })
}

fn derived_floor(current: &Version, target: &Version) -> Criticality {
    if current.major != target.major {
        Criticality::StronglyRecommended
    } else if current.minor != target.minor {
        Criticality::Recommended
    } else {
        Criticality::Possible
    }
}

proptest! {
    #[test]
    fn next_upgrade_is_strictly_greater(releases in release_set()) {
        for current in &releases {
            if let Some(step) = find_next_upgrade(&releases, &current.version).unwrap() {
                prop_assert!(step.release.version > current.version);
            }
        }
    }

    #[test]
    fn path_is_ascending_and_starts_at_the_next_step(releases in release_set()) {
        for current in &releases {
            let step = find_next_upgrade(&releases, &current.version).unwrap();
            let path =
                find_upgrade_path(&releases, &current.version, &CancelToken::new()).unwrap();

            match (step, path) {
                (None, None) => {}
                (Some(step), Some(path)) => {
                    prop_assert_eq!(&path.steps[0].release.version, &step.release.version);
                    prop_assert_eq!(path.steps[0].criticality, step.criticality);
                    prop_assert_eq!(path.criticality, path.steps[0].criticality);

                    let mut last = current.version.clone();
                    for path_step in &path.steps {
                        prop_assert!(path_step.release.version > last);
                        last = path_step.release.version.clone();
                    }
                }
                (step, path) => {
                    prop_assert!(false, "step {:?} and path {:?} disagree", step, path);
                }
            }
        }
    }

    #[test]
    fn install_version_is_the_semver_maximum(releases in release_set()) {
        let newest = releases.iter().map(|r| &r.version).max().cloned();
        let chosen = find_install_version(&releases, true)
            .unwrap()
            .map(|step| step.release.version);
        prop_assert_eq!(chosen, newest);

        let newest_stable = releases
            .iter()
            .filter(|r| !r.unstable)
            .map(|r| &r.version)
            .max()
            .cloned();
        let chosen_stable = find_install_version(&releases, false)
            .unwrap()
            .map(|step| step.release.version);
        prop_assert_eq!(chosen_stable, newest_stable);
    }

    #[test]
    fn criticality_never_drops_below_the_floor(releases in release_set()) {
        for current in &releases {
            if let Some(step) = find_next_upgrade(&releases, &current.version).unwrap() {
                let floor = derived_floor(&current.version, &step.release.version)
                    .max(current.should_upgrade);
                prop_assert!(step.criticality >= floor);
            }
        }
    }

    #[test]
    fn arbitrary_noise_is_rejected_by_validation(noise in "[a-z!?,;:]{1,12}") {
        let target = UpgradeTarget::new(noise.clone());
        if target.is_valid() {
            // The only valid strings in this alphabet are the empty-target
            // forms handled by the modifier.
            prop_assert!(noise == "nopatches:");
        }
    }
}
