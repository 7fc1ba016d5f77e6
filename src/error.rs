//! Service Error Types
//!
//! One taxonomy shared by the credential store, the attendance ledger and the
//! task/reservation books. Handlers translate variants 1:1 to HTTP status codes.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::gateway::types::{ApiResponse, error_codes};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    // === Input ===
    #[error("{0}")]
    Validation(String),

    // === Identity ===
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    // === Attendance state machine ===
    #[error("Start time already recorded")]
    AlreadyStarted,

    #[error("End time already recorded")]
    AlreadyEnded,

    #[error("Start time not recorded yet")]
    NotStarted,

    // === System ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ServiceError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ServiceError::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ServiceError::Internal(msg.into())
    }

    /// Stable string code, used in logs
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "VALIDATION_ERROR",
            ServiceError::Unauthorized => "UNAUTHORIZED",
            ServiceError::Conflict(_) => "CONFLICT",
            ServiceError::NotFound(_) => "NOT_FOUND",
            ServiceError::AlreadyStarted => "ALREADY_STARTED",
            ServiceError::AlreadyEnded => "ALREADY_ENDED",
            ServiceError::NotStarted => "NOT_STARTED",
            ServiceError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Numeric code carried in the response envelope
    pub fn api_code(&self) -> i32 {
        match self {
            ServiceError::Validation(_) => error_codes::INVALID_PARAMETER,
            ServiceError::Unauthorized => error_codes::AUTH_FAILED,
            ServiceError::Conflict(_) => error_codes::ALREADY_EXISTS,
            ServiceError::NotFound(_) => error_codes::NOT_FOUND,
            ServiceError::AlreadyStarted => error_codes::ALREADY_STARTED,
            ServiceError::AlreadyEnded => error_codes::ALREADY_ENDED,
            ServiceError::NotStarted => error_codes::NOT_STARTED,
            ServiceError::Internal(_) => error_codes::INTERNAL_ERROR,
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_)
            | ServiceError::AlreadyStarted
            | ServiceError::AlreadyEnded
            | ServiceError::NotStarted => StatusCode::BAD_REQUEST,
            ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand to the client
    pub fn public_message(&self) -> String {
        match self {
            ServiceError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Internal(format!("database: {}", e))
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(e: validator::ValidationErrors) -> Self {
        ServiceError::Validation(e.to_string())
    }
}

impl From<tokio::task::JoinError> for ServiceError {
    fn from(e: tokio::task::JoinError) -> Self {
        ServiceError::Internal(format!("blocking task: {}", e))
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        if let ServiceError::Internal(detail) = &self {
            tracing::error!(code = self.code(), "{}", detail);
        } else {
            tracing::debug!(code = self.code(), "request rejected: {}", self);
        }
        let body = ApiResponse::<()>::error(self.api_code(), self.public_message());
        (self.http_status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status() {
        assert_eq!(
            ServiceError::validation("x").http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::Unauthorized.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ServiceError::Conflict("dup".into()).http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::not_found("x").http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::AlreadyStarted.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::AlreadyEnded.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::NotStarted.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::internal("boom").http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_detail_not_public() {
        let err = ServiceError::internal("duplicate key value violates constraint users_tb_email");
        assert_eq!(err.public_message(), "Internal server error");
        assert!(err.to_string().contains("users_tb_email"));
    }

    #[test]
    fn test_codes() {
        assert_eq!(ServiceError::AlreadyStarted.code(), "ALREADY_STARTED");
        assert_eq!(ServiceError::NotStarted.code(), "NOT_STARTED");
        assert_eq!(
            ServiceError::AlreadyEnded.api_code(),
            error_codes::ALREADY_ENDED
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ServiceError::AlreadyEnded.to_string(),
            "End time already recorded"
        );
    }
}
