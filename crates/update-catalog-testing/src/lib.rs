//! Test support for the update catalog: an in-memory store and fixture
//! builders.

pub mod builders;
pub mod memory;

pub use builders::ReleaseBuilder;
pub use memory::MemoryCatalogStore;
