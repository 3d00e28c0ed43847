use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

pub type AppResult<T> = Result<T, AppError>;

/// Errors surfaced by HTTP handlers
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed request fields
    #[error("{0}")]
    Validation(String),

    /// Bad credentials, invalid token or inactive user
    #[error("{0}")]
    Unauthorized(String),

    /// Upload body over the configured size limit
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Storage credentials or bucket not configured
    #[error("Storage not configured: {0}")]
    Config(String),

    /// Upload rejected by the storage backend
    #[error("Storage error: {0}")]
    Storage(String),

    /// Datastore or other unexpected failure
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Storage(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:#}", e);
                "Server error".to_string()
            }
            AppError::Config(_) | AppError::Storage(_) => {
                tracing::error!("{}", self);
                self.to_string()
            }
            _ => self.to_string(),
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}
