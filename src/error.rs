//! Error types for the application

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::models::RequestStatus;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Cannot {action} request in status '{from}'")]
    InvalidTransition {
        action: &'static str,
        from: RequestStatus,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    /// The primary status write committed but the paired side-table write or
    /// delete did not. The request and its projection are out of sync until
    /// reconciled.
    #[error("Side effect failed: {0}")]
    SideEffect(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }
            AppError::Validation(e) => (StatusCode::BAD_REQUEST, e.clone()),
            AppError::InvalidTransition { .. } => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::NotFound(e) => (StatusCode::NOT_FOUND, e.clone()),
            AppError::SideEffect(e) => {
                tracing::error!("Side effect failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Side effect failed: {}", e),
                )
            }
        };

        (status, message).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
