// src/api/extract.rs
//! `Json`/`Query` wrappers whose rejections render through [`ApiError`], so a
//! malformed body or query string gets the same `{ "error": .. }` shape as
//! every other validation failure.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
