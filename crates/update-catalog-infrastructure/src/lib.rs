//! Infrastructure layer: the PostgreSQL-backed store.
//!
//! Implements the application crate's [`CatalogStore`] port over sqlx.
//! Request cancellation propagates by dropping the in-flight future; sqlx
//! aborts the underlying query when that happens, so no explicit signal is
//! threaded through the store.
//!
//! [`CatalogStore`]: update_catalog_application::CatalogStore

pub mod database;
pub mod store;

pub use database::{DatabaseConfig, DatabasePool};
pub use store::PgCatalogStore;
