//! Request extractors whose rejections render as [`AppError`].

use axum::extract::FromRequest;

use crate::error::AppError;

/// `axum::Json` with malformed or missing bodies reported as 400 validation errors.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);
