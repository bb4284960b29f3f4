//! Error types for Book Verse server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Error kind discriminator carried in every failure body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    ValidationError,
    NotFound,
    InsufficientStock,
    UniquenessViolation,
    StorageError,
    InternalError,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Validation failed")]
    InvalidInput(#[from] validator::ValidationErrors),

    #[error("{0}")]
    NotFound(String),

    #[error("Not enough copies available: requested {requested}, available {available}")]
    InsufficientStock { requested: i32, available: i32 },

    #[error("{field} with value '{value}' already exists.")]
    Conflict { field: String, value: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation(_) | AppError::InvalidInput(_) => ErrorKind::ValidationError,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            AppError::Conflict { .. } => ErrorKind::UniquenessViolation,
            AppError::Database(_) => ErrorKind::StorageError,
            AppError::Internal(_) => ErrorKind::InternalError,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::ValidationError => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::InsufficientStock | ErrorKind::UniquenessViolation => StatusCode::CONFLICT,
            ErrorKind::StorageError | ErrorKind::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn book_not_found(id: impl std::fmt::Display) -> Self {
        AppError::NotFound(format!("Book with id {} not found", id))
    }
}

/// Error details nested under `error`
#[derive(Serialize, ToSchema)]
pub struct ErrorDetails {
    pub kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
}

/// Error response body
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    pub error: ErrorDetails,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (message, details) = match &self {
            AppError::InvalidInput(errors) => {
                (self.to_string(), serde_json::to_value(errors).ok())
            }
            AppError::InsufficientStock {
                requested,
                available,
            } => (
                self.to_string(),
                Some(serde_json::json!({ "requested": requested, "available": available })),
            ),
            AppError::Conflict { field, value } => (
                self.to_string(),
                Some(serde_json::json!({ "field": field, "value": value })),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                ("Database error".to_string(), None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("Internal server error".to_string(), None)
            }
            _ => (self.to_string(), None),
        };

        let body = Json(ErrorResponse {
            success: false,
            message,
            error: ErrorDetails {
                kind: self.kind(),
                details,
            },
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
