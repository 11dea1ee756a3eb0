//! Request extractors
//!
//! `ApiJson` is `axum::Json` with its rejections rendered as `{"detail": ...}`.

use axum::extract::FromRequest;

use crate::http::error::ApiError;

/// JSON request body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
