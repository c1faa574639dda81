//! Domain model of the update catalog.
//!
//! This crate holds everything the planner needs and nothing it does not:
//! the version algebra, the upgrade-target grammar and evaluator, the
//! release filter, the planner itself, and the entity types shared across
//! the workspace. It performs no I/O and has no async surface; services
//! and stores live in the application and infrastructure crates.

pub mod app;
pub mod cancel;
pub mod client;
pub mod criticality;
pub mod errors;
pub mod filter;
pub mod group;
pub mod planner;
pub mod release;
pub mod state;
pub mod target;
pub mod variant;
pub mod version;

pub use app::App;
pub use cancel::CancelToken;
pub use client::Client;
pub use criticality::Criticality;
pub use errors::{CatalogError, CatalogResult};
pub use filter::{GroupFilter, ReleaseFilter, VariantFilter};
pub use group::{check_group_names, format_groups, Group, PUBLIC_GROUP};
pub use planner::{
    find_install_version, find_next_upgrade, find_upgrade_path, UpgradeInfo, UpgradePath,
    UpgradeStep,
};
pub use release::{Release, ReleaseHistory};
pub use state::ClientState;
pub use target::{TargetSpec, UpgradeTarget, DEFAULT_UPGRADE_TARGET};
pub use variant::Variant;
pub use version::Version;
