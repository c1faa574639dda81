//! Registered client installations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered installation of an app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub uuid: Uuid,
    pub vendor: String,
    pub product: String,
    pub variant: String,
    pub name: String,
    pub active: bool,
    pub locked: bool,
    /// Hydrated by the store layer
    pub groups: Vec<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}
