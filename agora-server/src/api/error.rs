use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use agora_types::ErrorResponse;

use crate::usecase::ServiceError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    Conflict(String),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, details) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, Some(msg)),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, Some(msg)),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, Some(msg)),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, Some(msg)),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, Some(msg)),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Some("An unexpected error occurred".to_string()),
                )
            }
        };

        let error_response = ErrorResponse {
            error: status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
            details,
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        match err {
            ServiceError::NotFound => ApiError::NotFound(message),
            ServiceError::DuplicateEmail | ServiceError::DuplicateUsername => {
                ApiError::Conflict(message)
            }
            ServiceError::InvalidCredentials => ApiError::Unauthorized(message),
            ServiceError::Unauthorized => ApiError::Forbidden(message),
            ServiceError::CannotFollowSelf | ServiceError::Validation(_) => {
                ApiError::BadRequest(message)
            }
            ServiceError::Internal { source, .. } => {
                ApiError::InternalError(format!("{message}: {source:#}"))
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("invalid request body: {}", rejection.body_text()))
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(format!("{err:#}"))
    }
}
