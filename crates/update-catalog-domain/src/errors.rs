//! Error types shared across the catalog.
//!
//! One enum covers the error kinds every layer can surface; adapters map
//! the kinds to their own status codes via [`CatalogError::http_status`].

use crate::criticality::CriticalityError;
use crate::target::TargetError;
use crate::version::VersionError;

/// Top-level catalog error type
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// A required field is missing or an input is malformed
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Version parsing failed
    #[error(transparent)]
    InvalidVersion(#[from] VersionError),

    /// Upgrade target parsing failed
    #[error(transparent)]
    InvalidTarget(#[from] TargetError),

    /// Criticality parsing failed
    #[error(transparent)]
    InvalidCriticality(#[from] CriticalityError),

    /// App lookup failed because the app does not exist
    #[error("unknown app: {vendor} {product}")]
    UnknownApp { vendor: String, product: String },

    /// Variant lookup failed
    #[error("unknown variant: {0}")]
    UnknownVariant(String),

    /// Group lookup failed
    #[error("unknown group: {0}")]
    UnknownGroup(String),

    /// The app or variant disallows client registration
    #[error("client registration not allowed")]
    RegistrationForbidden,

    /// An internal planner precondition was violated
    #[error("planner failure: {0}")]
    Planner(String),

    /// Any persistence error
    #[error("store error: {0}")]
    Store(String),

    /// The request context was cancelled
    #[error("request cancelled")]
    Cancelled,
}

impl CatalogError {
    /// The HTTP status code an adapter should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidInput(_)
            | Self::InvalidVersion(_)
            | Self::InvalidTarget(_)
            | Self::InvalidCriticality(_) => 422,
            Self::UnknownApp { .. }
            | Self::UnknownVariant(_)
            | Self::UnknownGroup(_)
            | Self::RegistrationForbidden => 400,
            Self::Planner(_) | Self::Store(_) => 500,
            Self::Cancelled => 499,
        }
    }
}

/// Catalog-wide result type
pub type CatalogResult<T> = Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(CatalogError::InvalidInput("x".into()).http_status(), 422);
        assert_eq!(
            CatalogError::UnknownApp {
                vendor: "acme".into(),
                product: "anvil".into()
            }
            .http_status(),
            400
        );
        assert_eq!(CatalogError::RegistrationForbidden.http_status(), 400);
        assert_eq!(CatalogError::Planner("bug".into()).http_status(), 500);
        assert_eq!(CatalogError::Cancelled.http_status(), 499);
    }
}
