use axum::extract::FromRequest;

use super::ApiError;

/// `Json` extractor that rejects bad bodies with an `ApiError` body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
