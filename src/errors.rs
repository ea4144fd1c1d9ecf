// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for entire application

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;

/// Application-specific error types
/// DOCUMENTATION: Comprehensive error enum for all possible failures
/// Each variant maps to appropriate HTTP status code and error response
#[derive(Error, Debug)]
pub enum FoodgramError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    AlreadyExists(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Authentication credentials were not provided or are invalid")]
    Unauthorized,

    #[error("You do not have permission to perform this action")]
    Forbidden,

    #[error("Invalid HTTP_HOST header: {0}")]
    DisallowedHost(String),

    #[error("Internal server error")]
    InternalError,
}

impl FoodgramError {
    /// Wrap a sqlx error, logging it with context
    /// DOCUMENTATION: Unique violations become AlreadyExists so races on
    /// favorites/subscriptions surface as 400 instead of 500
    pub fn from_db(context: &str, e: sqlx::Error) -> Self {
        if let Some(db_err) = e.as_database_error() {
            if db_err.is_unique_violation() {
                log::debug!("{}: unique violation: {}", context, db_err);
                return FoodgramError::AlreadyExists(format!("{}: already exists", context));
            }
        }
        log::error!("{}: {}", context, e);
        FoodgramError::DatabaseError(format!("{} failed", context))
    }

    fn code(&self) -> &'static str {
        match self {
            FoodgramError::NotFound(_) => "NOT_FOUND",
            FoodgramError::AlreadyExists(_) => "ALREADY_EXISTS",
            FoodgramError::DatabaseError(_) => "DATABASE_ERROR",
            FoodgramError::InvalidInput(_) => "INVALID_INPUT",
            FoodgramError::ValidationError(_) => "VALIDATION_ERROR",
            FoodgramError::Unauthorized => "UNAUTHORIZED",
            FoodgramError::Forbidden => "FORBIDDEN",
            FoodgramError::DisallowedHost(_) => "DISALLOWED_HOST",
            FoodgramError::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl From<validator::ValidationErrors> for FoodgramError {
    fn from(e: validator::ValidationErrors) -> Self {
        FoodgramError::ValidationError(e.to_string())
    }
}

/// Convert FoodgramError to HTTP response
/// DOCUMENTATION: Maps error types to HTTP status codes and JSON responses
impl ResponseError for FoodgramError {
    fn error_response(&self) -> HttpResponse {
        let body = json!({
            "detail": self.to_string(),
            "code": self.code(),
        });

        HttpResponse::build(self.status_code()).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            FoodgramError::NotFound(_) => StatusCode::NOT_FOUND,
            FoodgramError::AlreadyExists(_) => StatusCode::BAD_REQUEST,
            FoodgramError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            FoodgramError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            FoodgramError::ValidationError(_) => StatusCode::BAD_REQUEST,
            FoodgramError::Unauthorized => StatusCode::UNAUTHORIZED,
            FoodgramError::Forbidden => StatusCode::FORBIDDEN,
            FoodgramError::DisallowedHost(_) => StatusCode::BAD_REQUEST,
            FoodgramError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            FoodgramError::NotFound("Recipe".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            FoodgramError::AlreadyExists("dup".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(FoodgramError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(FoodgramError::Forbidden.status_code(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_error_body_does_not_leak_sql() {
        let err = FoodgramError::from_db("Create recipe", sqlx::Error::RowNotFound);
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "DATABASE_ERROR");
        assert_eq!(json["detail"], "Database error: Create recipe failed");
    }
}
