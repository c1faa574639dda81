//! HTTP error handling and conversion.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use update_catalog_domain::CatalogError;

/// API-specific error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Catalog error, mapped through its own status code
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Malformed request at the HTTP boundary
    #[error("{0}")]
    BadRequest(String),

    /// Missing required field in a request body
    #[error("{0}")]
    Unprocessable(String),

    /// Internal server error
    #[error("internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Catalog(err) => StatusCode::from_u16(err.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Catalog(err) => match err {
                CatalogError::InvalidInput(_)
                | CatalogError::InvalidVersion(_)
                | CatalogError::InvalidTarget(_)
                | CatalogError::InvalidCriticality(_) => "INVALID_INPUT",
                CatalogError::UnknownApp { .. } => "UNKNOWN_APP",
                CatalogError::UnknownVariant(_) => "UNKNOWN_VARIANT",
                CatalogError::UnknownGroup(_) => "UNKNOWN_GROUP",
                CatalogError::RegistrationForbidden => "REGISTRATION_FORBIDDEN",
                CatalogError::Planner(_) => "PLANNER_FAILURE",
                CatalogError::Store(_) => "STORE_FAILURE",
                CatalogError::Cancelled => "CANCELLED",
            },
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Unprocessable(_) => "INVALID_INPUT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Standardized error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.error_code().to_string(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
