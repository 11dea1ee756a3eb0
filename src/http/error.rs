//! HTTP error responses
//!
//! Every failure is rendered as `{"detail": "..."}` with a matching status.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::{OdooError, ValidationError};

/// Error returned by route handlers
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    /// No active connection
    pub fn not_connected() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "Not connected to Odoo. Use /connect endpoint first.",
        )
    }

    /// Remote failure for `operation`, e.g. "Search failed: ..."
    pub fn operation(operation: &str, err: OdooError) -> Self {
        tracing::error!("{} error: {}", operation, err);

        match err {
            OdooError::NotConnected => Self::not_connected(),
            OdooError::MissingConnectionParams => {
                Self::new(StatusCode::BAD_REQUEST, err.to_string())
            }
            other => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("{} failed: {}", operation, other),
            ),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ValidationError::from(errors).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
