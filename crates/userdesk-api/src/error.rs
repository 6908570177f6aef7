//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps `userdesk-core` errors to HTTP status codes and returns JSON bodies
//! with an error code and message. Internal error details are never exposed.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use userdesk_core::{ChangeEmailError, CommandError};
use utoipa::ToSchema;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "FORBIDDEN", "CONFLICT").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorBody {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.to_string(),
                message: message.into(),
            },
        }
    }
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed request: bad path identifier, missing field, unparsable body (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// A business rule rejected the command (400).
    #[error("validation error: {0}")]
    Validation(String),

    /// Authentication failure: missing or invalid token (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authorization failure: caller may not act on this resource (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Conflict with current resource state (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Downstream dependency unavailable or timed out (503).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            // Client-input messages are returned verbatim.
            Self::BadRequest(msg) => msg.clone(),
            other => other.to_string(),
        };

        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        (status, Json(ErrorBody::new(code, message))).into_response()
    }
}

/// Dispatcher classifications map one-to-one onto HTTP errors.
impl From<CommandError> for AppError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Validation(msg) => Self::Validation(msg),
            CommandError::Conflict(msg) => Self::Conflict(msg),
            CommandError::NotFound(msg) => Self::NotFound(msg),
            CommandError::Unavailable(msg) => Self::ServiceUnavailable(msg),
            CommandError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl From<ChangeEmailError> for AppError {
    fn from(err: ChangeEmailError) -> Self {
        match err {
            ChangeEmailError::InvalidIdentifier(e) => Self::BadRequest(e.to_string()),
            ChangeEmailError::MissingField(e) => Self::BadRequest(e.to_string()),
            e @ ChangeEmailError::Forbidden => Self::Forbidden(e.to_string()),
            ChangeEmailError::Session(e) => Self::Unauthorized(e.to_string()),
            ChangeEmailError::Dispatch(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use userdesk_core::{SessionError, ValidationError};

    #[test]
    fn status_codes() {
        let cases = [
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            (AppError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            (AppError::Forbidden("x".into()), StatusCode::FORBIDDEN, "FORBIDDEN"),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT, "CONFLICT"),
            (
                AppError::ServiceUnavailable("x".into()),
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
            ),
            (
                AppError::Internal("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.status_and_code(), (status, code), "{err:?}");
        }
    }

    #[test]
    fn invalid_identifier_is_bad_request() {
        let err = AppError::from(ChangeEmailError::InvalidIdentifier(
            ValidationError::InvalidUserId("nope".into()),
        ));
        assert!(matches!(err, AppError::BadRequest(ref m) if m.contains("nope")));
    }

    #[test]
    fn missing_field_keeps_message() {
        let err = AppError::from(ChangeEmailError::MissingField(ValidationError::MissingField {
            field: "email",
            message: "Email can't be null".into(),
        }));
        assert!(matches!(err, AppError::BadRequest(ref m) if m == "Email can't be null"));
    }

    #[test]
    fn forbidden_maps_to_403() {
        let err = AppError::from(ChangeEmailError::Forbidden);
        assert_eq!(err.status_and_code().0, StatusCode::FORBIDDEN);
    }

    #[test]
    fn session_failure_maps_to_401() {
        let err = AppError::from(ChangeEmailError::Session(SessionError("gone".into())));
        assert_eq!(err.status_and_code().0, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn dispatcher_errors_keep_their_classification() {
        let cases = [
            (CommandError::Validation("v".into()), StatusCode::BAD_REQUEST),
            (CommandError::Conflict("c".into()), StatusCode::CONFLICT),
            (CommandError::NotFound("n".into()), StatusCode::NOT_FOUND),
            (CommandError::Unavailable("u".into()), StatusCode::SERVICE_UNAVAILABLE),
            (CommandError::Internal("i".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (cmd_err, status) in cases {
            let err = AppError::from(ChangeEmailError::Dispatch(cmd_err));
            assert_eq!(err.status_and_code().0, status);
        }
    }

    async fn response_parts(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn into_response_conflict() {
        let (status, body) = response_parts(AppError::Conflict("email taken".into())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.error.code, "CONFLICT");
        assert!(body.error.message.contains("email taken"));
    }

    #[tokio::test]
    async fn into_response_bad_request_is_unprefixed() {
        let (status, body) =
            response_parts(AppError::BadRequest("Email can't be null".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error.code, "BAD_REQUEST");
        assert_eq!(body.error.message, "Email can't be null");
    }

    #[tokio::test]
    async fn into_response_internal_hides_details() {
        let (status, body) = response_parts(AppError::Internal("db connection failed".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.code, "INTERNAL_ERROR");
        assert_eq!(body.error.message, "An internal error occurred");
    }
}
