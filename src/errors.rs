use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

/// Classified request error — tells the HTTP boundary *why* an operation
/// failed so it can pick the right status code.
#[derive(Debug)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Malformed or out-of-range input.
    Validation,
    /// Missing/invalid/expired token or bad credentials.
    Unauthorized,
    /// Uniqueness violation (email, username, sub-goal name, password already set).
    Conflict,
    /// Resource absent, or present but not owned by the caller.
    NotFound,
    /// The identity provider returned no usable assertion, or the callback
    /// request itself was unusable.
    BadRequest,
    /// Anything else — surfaces as 500, details stay in the log.
    Internal,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Validation,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Unauthorized,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Conflict,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::NotFound,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::BadRequest,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind {
            ApiErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            ApiErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            // Conflicts surface as 400 to callers, matching the error
            // contract for duplicate email/username/sub-goal name.
            ApiErrorKind::Conflict => StatusCode::BAD_REQUEST,
            ApiErrorKind::NotFound => StatusCode::NOT_FOUND,
            ApiErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ApiErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self {
            kind: ApiErrorKind::Internal,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(kind = ?self.kind, "Request failed: {}", self.message);
            // Don't leak internals to the client.
            return (status, Json(json!({"detail": "Internal server error"}))).into_response();
        }
        (status, Json(json!({"detail": self.message}))).into_response()
    }
}

/// True if the error wraps a database unique-constraint violation.
///
/// Store methods return `anyhow::Result`; callers that need to convert a
/// specific constraint into a domain error (sub-goal names) check with this
/// instead of string-matching the message.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}
