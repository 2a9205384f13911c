//! Error Handling
//!
//! Error types for the store and service layers, plus the HTTP error
//! representation returned by API handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the data store layer.
///
/// Reads execute directly and can only fail with `Database`; staged writes
/// surface constraint violations at commit time.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying database failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A unique constraint was violated at commit time
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
}

/// Errors produced by the domain services.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Requested entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// Request conflicts with existing state (duplicate email, missing parent)
    #[error("{0}")]
    Conflict(String),

    /// Caller lacks permission for the operation or presented bad credentials
    #[error("{0}")]
    Unauthorized(String),

    /// Input failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// Password hashing failed
    #[error("Password hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    /// Token could not be issued
    #[error("Token generation error: {0}")]
    TokenGeneration(String),

    /// Unexpected internal failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Database(e) => ServiceError::Database(e),
            StoreError::UniqueViolation(constraint) => {
                if constraint.contains("email") {
                    ServiceError::Conflict("Email already exists".to_string())
                } else {
                    ServiceError::Conflict(format!("Constraint violated: {}", constraint))
                }
            }
        }
    }
}

/// Result type alias for domain service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Main application error type returned from HTTP handlers
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Validation errors for user input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Authentication and authorization errors
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Resource not found errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Conflict errors (e.g., duplicate resources)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Generic internal server errors
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Password hashing errors
    #[error("Password hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(msg) => AppError::NotFound(msg),
            ServiceError::Conflict(msg) => AppError::Conflict(msg),
            ServiceError::Unauthorized(msg) => AppError::Authentication(msg),
            ServiceError::Validation(msg) => AppError::Validation(msg),
            ServiceError::Database(e) => AppError::Database(e),
            ServiceError::Hashing(e) => AppError::Hashing(e),
            ServiceError::TokenGeneration(msg) => AppError::Internal(msg),
            ServiceError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Standard error response structure for API endpoints
#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Internal detail is logged here and never echoed to the client.
        let (status, error_code, message) = match self {
            AppError::Database(e) => {
                log::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, "AUTHENTICATION_ERROR", msg)
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            AppError::Internal(msg) => {
                log::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
            AppError::Hashing(e) => {
                log::error!("Password hashing error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "HASHING_ERROR",
                    "Password hashing error".to_string(),
                )
            }
        };

        let error_response = ErrorResponse::new(error_code, &message);
        (status, Json(error_response)).into_response()
    }
}

/// Result type alias for operations that can return AppError
pub type AppResult<T> = Result<T, AppError>;
