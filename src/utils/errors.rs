//! Error handling
//!
//! Every failure the service can report, and how each one maps onto an HTTP
//! response body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Main application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// The operation would break a lifecycle invariant
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JWT error: {0}")]
    Jwt(String),

    #[error("Hash error: {0}")]
    Hash(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error body returned by the API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    code: String,
}

impl ErrorResponse {
    fn new(error: &str, message: String, code: &str) -> Self {
        Self {
            success: false,
            error: error.to_string(),
            message,
            details: None,
            code: code.to_string(),
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidState(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateKey(_) => StatusCode::CONFLICT,
            AppError::ValidationError(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) | AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Database(_) | AppError::Hash(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            AppError::NotFound(msg) => {
                tracing::debug!("Resource not found: {}", msg);
                ErrorResponse::new("Not Found", msg, "NOT_FOUND")
            }

            AppError::InvalidState(msg) => {
                tracing::info!("Rejected state transition: {}", msg);
                ErrorResponse::new("Invalid State", msg, "INVALID_STATE")
            }

            AppError::DuplicateKey(msg) => {
                tracing::info!("Duplicate key: {}", msg);
                ErrorResponse::new("Duplicate Key", msg, "DUPLICATE_KEY")
            }

            AppError::ValidationError(msg) => {
                ErrorResponse::new("Validation Error", msg, "VALIDATION_ERROR")
            }

            AppError::Validation(e) => ErrorResponse::new(
                "Validation Error",
                "The provided data is invalid".to_string(),
                "VALIDATION_ERROR",
            )
            .with_details(json!(e)),

            AppError::Unauthorized(msg) => {
                tracing::warn!("Unauthorized access: {}", msg);
                ErrorResponse::new("Unauthorized", msg, "UNAUTHORIZED")
            }

            AppError::Forbidden(msg) => {
                tracing::warn!("Forbidden access: {}", msg);
                ErrorResponse::new("Forbidden", msg, "FORBIDDEN")
            }

            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                ErrorResponse::new(
                    "Database Error",
                    "An error occurred while accessing the database".to_string(),
                    "DB_ERROR",
                )
            }

            AppError::Jwt(msg) => {
                tracing::warn!("JWT error: {}", msg);
                ErrorResponse::new("JWT Error", msg, "JWT_ERROR")
            }

            AppError::Hash(msg) => {
                tracing::error!("Hash error: {}", msg);
                ErrorResponse::new(
                    "Hash Error",
                    "An error occurred while processing credentials".to_string(),
                    "HASH_ERROR",
                )
            }

            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ErrorResponse::new(
                    "Internal Server Error",
                    "An unexpected error occurred".to_string(),
                    "INTERNAL_ERROR",
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Typed result for fallible operations
pub type AppResult<T> = Result<T, AppError>;

pub fn not_found_error(resource: &str) -> AppError {
    AppError::NotFound(format!("{} not found", resource))
}

pub fn duplicate_key_error(resource: &str, field: &str, value: &str) -> AppError {
    AppError::DuplicateKey(format!("A {} with this {} already exists: '{}'", resource, field, value))
}

/// Turns a Postgres unique violation (SQLSTATE 23505) into `DuplicateKey`
pub fn map_unique_violation(err: sqlx::Error, on_duplicate: impl FnOnce() -> AppError) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => on_duplicate(),
        _ => AppError::Database(err),
    }
}

/// Turns a Postgres foreign key violation (SQLSTATE 23503) into the given error
pub fn map_foreign_key_violation(
    err: sqlx::Error,
    on_violation: impl FnOnce() -> AppError,
) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23503") => on_violation(),
        _ => AppError::Database(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(not_found_error("Motor").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::InvalidState("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            duplicate_key_error("motor", "serial number", "S/N-1").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_non_unique_database_error_passes_through() {
        let err = map_unique_violation(sqlx::Error::RowNotFound, || {
            duplicate_key_error("motor", "serial number", "S/N-1")
        });
        assert!(matches!(err, AppError::Database(_)));
    }

    #[test]
    fn test_non_foreign_key_database_error_passes_through() {
        let err = map_foreign_key_violation(sqlx::Error::RowNotFound, || not_found_error("Motor"));
        assert!(matches!(err, AppError::Database(_)));
    }
}
