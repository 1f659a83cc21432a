//! Error handling for the Warehouse ROI platform
//!
//! Every failure maps to a status code and a stable `code` string the
//! frontend can branch on.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::AnswerError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Export errors
    #[error("Export error: {0}")]
    Export(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field = errors
            .field_errors()
            .keys()
            .next()
            .map(|f| f.to_string())
            .unwrap_or_default();
        AppError::Validation {
            field,
            message: errors.to_string(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation {
            field: "body".to_string(),
            message: rejection.body_text(),
        }
    }
}

impl From<AnswerError> for AppError {
    fn from(error: AnswerError) -> Self {
        AppError::Validation {
            field: error.question_id().to_string(),
            message: error.to_string(),
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorDetail {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            field: None,
        }
    }

    fn with_field(mut self, field: &str) -> Self {
        self.field = Some(field.to_string());
        self
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials
            | AppError::TokenExpired
            | AppError::InvalidToken
            | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::InsufficientPermissions => StatusCode::FORBIDDEN,
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::DuplicateEntry(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Export(_)
            | AppError::Configuration(_)
            | AppError::DatabaseError(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> ErrorDetail {
        match self {
            AppError::InvalidCredentials => {
                ErrorDetail::new("INVALID_CREDENTIALS", "Invalid username or password")
            }
            AppError::TokenExpired => ErrorDetail::new("TOKEN_EXPIRED", "Token has expired"),
            AppError::InvalidToken => ErrorDetail::new("INVALID_TOKEN", "Invalid token"),
            AppError::InsufficientPermissions => ErrorDetail::new(
                "INSUFFICIENT_PERMISSIONS",
                "You do not have permission to perform this action",
            ),
            AppError::Unauthorized(message) => ErrorDetail::new("UNAUTHORIZED", message.clone()),
            AppError::Validation { field, message } => {
                ErrorDetail::new("VALIDATION_ERROR", message.clone()).with_field(field)
            }
            AppError::DuplicateEntry(field) => ErrorDetail::new(
                "DUPLICATE_ENTRY",
                format!("A record with this {} already exists", field),
            )
            .with_field(field),
            AppError::NotFound(resource) => {
                ErrorDetail::new("NOT_FOUND", format!("{} not found", resource))
            }
            AppError::Export(message) => {
                ErrorDetail::new("EXPORT_ERROR", format!("Export failed: {}", message))
            }
            AppError::Configuration(message) => ErrorDetail::new(
                "CONFIGURATION_ERROR",
                format!("Configuration error: {}", message),
            ),
            AppError::DatabaseError(_) => {
                ErrorDetail::new("DATABASE_ERROR", "A database error occurred")
            }
            AppError::Internal(_) => {
                ErrorDetail::new("INTERNAL_ERROR", "An internal server error occurred")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: self.detail() })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
