//! Application layer of the update catalog.
//!
//! Wires the pure planner from the domain crate to a [`CatalogStore`]
//! implementation and exposes the operations served over HTTP and the CLI.

pub mod service;
pub mod store;

pub use service::CatalogService;
pub use store::CatalogStore;
