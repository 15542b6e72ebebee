use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use petmetrics_store::StoreError;
use thiserror::Error;

use crate::types::ErrorResponse;

/// Errors returned by the store HTTP API.
///
/// The `code` sent with each error lets clients rebuild the original
/// [`StoreError`] variant.
#[derive(Error, Debug)]
pub enum HttpStoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("already exists: {0}")]
    AlreadyExists(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("throttled: {0}")]
    Throttled(String),
    #[error("unavailable: {0}")]
    Unavailable(String),
    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T, E = HttpStoreError> = std::result::Result<T, E>;

pub const CODE_NOT_FOUND: &str = "ResourceNotFound";
pub const CODE_CONFLICT: &str = "Conflict";
pub const CODE_VALIDATION: &str = "Validation";
pub const CODE_THROTTLING: &str = "Throttling";
pub const CODE_UNAVAILABLE: &str = "ServiceUnavailable";
pub const CODE_INTERNAL: &str = "InternalServer";

impl HttpStoreError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            HttpStoreError::NotFound(_) => StatusCode::NOT_FOUND,
            HttpStoreError::AlreadyExists(_) => StatusCode::CONFLICT,
            HttpStoreError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HttpStoreError::Throttled(_) => StatusCode::TOO_MANY_REQUESTS,
            HttpStoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            HttpStoreError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            HttpStoreError::NotFound(_) => CODE_NOT_FOUND,
            HttpStoreError::AlreadyExists(_) => CODE_CONFLICT,
            HttpStoreError::BadRequest(_) => CODE_VALIDATION,
            HttpStoreError::Throttled(_) => CODE_THROTTLING,
            HttpStoreError::Unavailable(_) => CODE_UNAVAILABLE,
            HttpStoreError::Internal(_) => CODE_INTERNAL,
        }
    }
}

impl From<StoreError> for HttpStoreError {
    fn from(error: StoreError) -> Self {
        let message = error.to_string();
        match error {
            StoreError::NotFound { .. } => HttpStoreError::NotFound(message),
            StoreError::AlreadyExists { .. } => HttpStoreError::AlreadyExists(message),
            StoreError::InvalidArgument { .. } | StoreError::InvalidResourceName { .. } => {
                HttpStoreError::BadRequest(message)
            }
            StoreError::Throttled { .. } => HttpStoreError::Throttled(message),
            StoreError::Unavailable { .. } => HttpStoreError::Unavailable(message),
            StoreError::Internal { .. } => HttpStoreError::Internal(message),
        }
    }
}

impl IntoResponse for HttpStoreError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let response = Json(ErrorResponse {
            code: self.code().to_string(),
            message: self.to_string(),
        });

        (status_code, response).into_response()
    }
}
