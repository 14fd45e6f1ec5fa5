//! Extractors whose rejections render as [`AppError`] JSON bodies.
//!
//! axum's own `Json` and `Path` reject with plain text; handlers use these
//! wrappers so a malformed body or id gets the usual `{error, code}` shape.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// `axum::Json` with an [`AppError::BadRequest`] rejection.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Path` with an [`AppError::BadRequest`] rejection.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);
