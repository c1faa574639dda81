//! HTTP adapter for the update catalog.
//!
//! Translates JSON requests into catalog service calls and maps error
//! kinds onto status codes: invalid input 422, unknown entities and
//! forbidden registration 400, planner and store failures 500, cancelled
//! requests 499.

pub mod app;
pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use app::{create_app, serve};
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use state::{AppState, CatalogApi};
