//! Error handling at the HTTP boundary.
//!
//! Every failure is reported in the uniform `{success: false, message,
//! error?}` envelope. Internal detail goes to the logs, not the caller.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use forno_shared::ErrorBody;
use std::fmt;

/// Application-level error type that converts to envelope responses.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    /// Field-level validation failure; the detail goes into `error`.
    Validation(String),
    Unauthorized(String),
    Forbidden(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Validation(msg) => write!(f, "Validation failed: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg) => ErrorBody::new(msg.clone()),
            AppError::Validation(detail) => {
                ErrorBody::new("Validation failed").with_detail(detail.clone())
            }
            AppError::Internal(detail) => {
                // Log internal errors; the caller gets a generic message.
                tracing::error!("Internal error: {}", detail);
                ErrorBody::new("Internal server error")
            }
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

// Conversion from domain errors
impl From<forno_core::error::DomainError> for AppError {
    fn from(err: forno_core::error::DomainError) -> Self {
        use forno_core::error::DomainError;
        match err {
            DomainError::NotFound { entity_type, id } => {
                AppError::NotFound(format!("{} with id {} not found", entity_type, id))
            }
            DomainError::Validation(msg) => AppError::Validation(msg),
            // Duplicates are a 400 on this API, not a 409.
            DomainError::Duplicate(msg) => AppError::BadRequest(msg),
            DomainError::Unauthorized => AppError::Unauthorized("Unauthorized".to_string()),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<forno_core::error::RepoError> for AppError {
    fn from(err: forno_core::error::RepoError) -> Self {
        use forno_core::error::RepoError;
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(msg) => AppError::BadRequest(msg),
            RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
