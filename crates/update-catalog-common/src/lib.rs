//! Shared plumbing for the update-catalog binaries: settings resolution
//! and telemetry initialization.

pub mod settings;
pub mod telemetry;

pub use settings::Settings;
pub use telemetry::init_tracing;
