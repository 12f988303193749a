//! Error types for HR Core.
//!
//! Defines a unified error type that maps cleanly to HTTP responses.

use axum::{
    extract::{
        multipart::MultipartError,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    /// Field name as sent by the client.
    pub field: String,
    /// Human-readable reason.
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Unified error type for HR Core operations.
#[derive(Debug, Error)]
pub enum HrError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl HrError {
    /// Translate constraint violations into a conflict carrying `message`.
    ///
    /// Any other database error is passed through unchanged.
    pub fn on_constraint(err: sqlx::Error, message: &str) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() || db.is_foreign_key_violation() {
                return HrError::Conflict(message.to_string());
            }
        }
        HrError::Database(err)
    }
}

impl From<JsonRejection> for HrError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                HrError::BadRequest("Content-Type must be application/json".to_string())
            }
            other => HrError::BadRequest(other.body_text()),
        }
    }
}

impl From<QueryRejection> for HrError {
    fn from(rejection: QueryRejection) -> Self {
        HrError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for HrError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            HrError::PayloadTooLarge(err.body_text())
        } else {
            HrError::BadRequest(err.body_text())
        }
    }
}

/// Error response body for API clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

impl IntoResponse for HrError {
    fn into_response(self) -> Response {
        let mut fields = Vec::new();
        let (status, code, message) = match self {
            HrError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            HrError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            HrError::Validation(errors) => {
                fields = errors;
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "VALIDATION_FAILED",
                    "One or more fields are invalid".to_string(),
                )
            }
            HrError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            HrError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
            HrError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg),
            HrError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg)
            }
            HrError::Database(e) => {
                // Log the actual error but don't expose internals
                tracing::error!(error = %e, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            HrError::Io(e) => {
                tracing::error!(error = %e, "I/O error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "IO_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            HrError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
            fields,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for HR operations.
pub type HrResult<T> = Result<T, HrError>;

/// Collects field errors and turns them into a single `Validation` error.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for `field` unless `ok` holds.
    pub fn check(&mut self, ok: bool, field: &str, message: &str) -> &mut Self {
        if !ok {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) -> &mut Self {
        self.errors.push(FieldError::new(field, message));
        self
    }

    pub fn finish(&mut self) -> HrResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(HrError::Validation(std::mem::take(&mut self.errors)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validator_collects_all_fields() {
        let mut v = Validator::new();
        v.check(false, "first_name", "too short")
            .check(true, "email", "invalid")
            .push("rut", "bad check digit");

        match v.finish() {
            Err(HrError::Validation(fields)) => {
                assert_eq!(fields.len(), 2);
                assert_eq!(fields[0].field, "first_name");
                assert_eq!(fields[1].field, "rut");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_validator_passes() {
        assert!(Validator::new().finish().is_ok());
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (HrError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (HrError::Conflict("x".into()), StatusCode::CONFLICT),
            (HrError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (
                HrError::Validation(vec![FieldError::new("a", "b")]),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (HrError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn test_database_error_body_hides_details() {
        let response = HrError::Database(sqlx::Error::RowNotFound).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "DATABASE_ERROR");
        assert_eq!(body["error"], "A database error occurred");
        assert!(body.get("details").is_none());
        assert!(body.get("fields").is_none());
    }
}
