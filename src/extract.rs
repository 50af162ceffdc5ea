//! Request extractors whose rejections render as `{"detail": ...}` bodies.

use axum::extract::{FromRequest, FromRequestParts};

use crate::errors::AppError;

/// `axum::Json` with rejections converted into [`AppError`].
///
/// Missing or mistyped fields yield 422, malformed JSON 400, and a missing
/// `Content-Type: application/json` header 415.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `axum::extract::Query` with rejections converted into [`AppError`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);
