//! Visibility groups scoping releases and clients within one app.

use crate::errors::CatalogError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The pseudo-group meaning "no group restriction".
pub const PUBLIC_GROUP: &str = "public";

/// An audience label, keyed by `(vendor, product, name)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub vendor: String,
    pub product: String,
    pub name: String,
    /// Releases published without an explicit group list inherit the
    /// default groups of their app
    pub is_default: bool,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// Render a group list for printing, with "(public)" for an empty list.
pub fn format_groups(groups: &[String]) -> String {
    if groups.is_empty() {
        return "(public)".to_string();
    }

    format!("({})", groups.join(", "))
}

/// Reject group lists that mix `public` with named groups.
pub fn check_group_names(groups: &[String]) -> Result<(), CatalogError> {
    if groups.is_empty() {
        return Err(CatalogError::InvalidInput("no groups given".to_string()));
    }

    let has_public = groups.iter().any(|g| g == PUBLIC_GROUP);
    let has_other = groups.iter().any(|g| g != PUBLIC_GROUP);

    if has_public && has_other {
        return Err(CatalogError::InvalidInput(
            "public and groups cannot be mixed".to_string(),
        ));
    }

    Ok(())
}
