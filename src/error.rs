//! Central application error type and HTTP response mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::application::services::resolver_service::ResolveError;
use crate::domain::repositories::AuthError;
use crate::infrastructure::store::StoreError;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Wire form of an error, embedded in JSON responses.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

/// Application-level error carried from services up to the HTTP boundary.
#[derive(Debug)]
pub enum AppError {
    Validation { message: String, details: Value },
    Unauthorized { message: String, details: Value },
    Forbidden { message: String, details: Value },
    NotFound { message: String, details: Value },
    Conflict { message: String, details: Value },
    /// The resource existed but is permanently unresolvable (expired link,
    /// exhausted click quota).
    Gone { message: String, details: Value },
    /// The record loaded but its payload could not be decrypted.
    /// Deliberately vague towards the client.
    Unresolvable { message: String, details: Value },
    /// The backing store could not be reached. Clients may retry.
    Unavailable { message: String, details: Value },
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn unauthorized(message: impl Into<String>, details: Value) -> Self {
        Self::Unauthorized {
            message: message.into(),
            details,
        }
    }
    pub fn forbidden(message: impl Into<String>, details: Value) -> Self {
        Self::Forbidden {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }
    pub fn gone(message: impl Into<String>, details: Value) -> Self {
        Self::Gone {
            message: message.into(),
            details,
        }
    }
    pub fn unresolvable(message: impl Into<String>, details: Value) -> Self {
        Self::Unresolvable {
            message: message.into(),
            details,
        }
    }
    pub fn unavailable(message: impl Into<String>, details: Value) -> Self {
        Self::Unavailable {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    fn parts(self) -> (StatusCode, &'static str, String, Value) {
        match self {
            Self::Validation { message, details } => {
                (StatusCode::BAD_REQUEST, "validation_error", message, details)
            }
            Self::Unauthorized { message, details } => {
                (StatusCode::UNAUTHORIZED, "unauthorized", message, details)
            }
            Self::Forbidden { message, details } => {
                (StatusCode::FORBIDDEN, "forbidden", message, details)
            }
            Self::NotFound { message, details } => {
                (StatusCode::NOT_FOUND, "not_found", message, details)
            }
            Self::Conflict { message, details } => {
                (StatusCode::CONFLICT, "conflict", message, details)
            }
            Self::Gone { message, details } => (StatusCode::GONE, "gone", message, details),
            Self::Unresolvable { message, details } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "unresolvable",
                message,
                details,
            ),
            Self::Unavailable { message, details } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "store_unavailable",
                message,
                details,
            ),
            Self::Internal { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                message,
                details,
            ),
        }
    }

    /// Converts into the wire form without consuming a response.
    pub fn to_error_info(&self) -> ErrorInfo {
        let (code, message, details) = match self {
            Self::Validation { message, details } => ("validation_error", message, details),
            Self::Unauthorized { message, details } => ("unauthorized", message, details),
            Self::Forbidden { message, details } => ("forbidden", message, details),
            Self::NotFound { message, details } => ("not_found", message, details),
            Self::Conflict { message, details } => ("conflict", message, details),
            Self::Gone { message, details } => ("gone", message, details),
            Self::Unresolvable { message, details } => ("unresolvable", message, details),
            Self::Unavailable { message, details } => ("store_unavailable", message, details),
            Self::Internal { message, details } => ("internal_error", message, details),
        };
        ErrorInfo {
            code,
            message: message.clone(),
            details: details.clone(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let info = self.to_error_info();
        write!(f, "{}: {}", info.code, info.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = self.parts();

        let body = ErrorBody {
            error: ErrorInfo {
                code,
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable(_) | StoreError::Contention => {
                AppError::unavailable("Store temporarily unavailable", json!({}))
            }
            StoreError::Malformed(_) => AppError::internal("Malformed stored document", json!({})),
        }
    }
}

impl From<ResolveError> for AppError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::NotFound => {
                AppError::not_found("Short link not found", json!({}))
            }
            ResolveError::Expired => AppError::gone(
                "This link has expired and is no longer available",
                json!({ "reason": "expired" }),
            ),
            ResolveError::QuotaExceeded => AppError::gone(
                "This link has reached its maximum number of clicks",
                json!({ "reason": "quota_exceeded" }),
            ),
            ResolveError::InvalidPassword => AppError::unauthorized(
                "Invalid password",
                json!({ "reason": "invalid_password", "retryable": true }),
            ),
            // One vague message for every decryption-stage failure.
            ResolveError::Decryption => AppError::unresolvable(
                "Failed to decrypt the link. It may be corrupted.",
                json!({}),
            ),
            ResolveError::Store(e) => e.into(),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::RateLimited => {
                AppError::unauthorized("Too many attempts", json!({ "retryable": true }))
            }
            AuthError::Network(_) => {
                AppError::unavailable("Account directory unavailable", json!({}))
            }
            _ => AppError::unauthorized("Unauthorized", json!({})),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        let details = serde_json::to_value(&e).unwrap_or_else(|_| json!(e.to_string()));
        AppError::bad_request("Validation failed", details)
    }
}
