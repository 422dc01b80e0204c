/// Request extractors
///
/// [`ApiJson`] is `axum::Json` with its rejection mapped onto [`ApiError`],
/// so a malformed or incomplete body gets the usual 400 JSON error instead
/// of axum's plain-text 422.

use crate::error::ApiError;
use axum::extract::FromRequest;

/// JSON request body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
