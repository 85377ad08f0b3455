//! # Centralized Error Handling
//!
//! This module defines the application-wide error type [`AppError`] used consistently
//! across all backend modules. It follows the `thiserror` pattern for ergonomic error handling.
//!
//! ## Error Categories
//!
//! 1. **Client Errors** (4xx) - input, session and lifecycle violations
//!    - [`Validation`](AppError::Validation) → 400, carries per-field messages
//!    - [`TokenNotFound`](AppError::TokenNotFound) / [`TokenExpired`](AppError::TokenExpired) → 400
//!    - [`IncorrectPassword`](AppError::IncorrectPassword) → 400
//!    - [`Unauthorized`](AppError::Unauthorized) / [`InvalidCredentials`](AppError::InvalidCredentials) → 401
//!    - [`EmailNotVerified`](AppError::EmailNotVerified) / [`AccountBanned`](AppError::AccountBanned) → 403
//!    - [`NotFound`](AppError::NotFound) / [`EmailNotFound`](AppError::EmailNotFound) → 404
//!    - [`Conflict`](AppError::Conflict) → 409
//!
//! 2. **Server Errors** (5xx) - detail is logged, never sent to the client
//!    - [`AuthFailure`](AppError::AuthFailure) → 500
//!    - [`Upstream`](AppError::Upstream) → 502 (mail, storage)
//!    - [`Config`](AppError::Config) / [`Internal`](AppError::Internal) → 500
//!
//! ## Usage Example
//!
//! ```rust
//! use lib_core::error::{AppError, FieldError, Result};
//!
//! fn check_name(name: &str) -> Result<()> {
//!     if name.trim().is_empty() {
//!         return Err(AppError::Validation(vec![FieldError::new(
//!             "first_name",
//!             "First name cannot be empty",
//!         )]));
//!     }
//!     Ok(())
//! }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

/// Convenience type alias for `Result<T, AppError>`.
pub type Result<T> = std::result::Result<T, AppError>;

/// One failing field of a request schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Application-wide error type covering all error scenarios.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request failed schema validation.
    #[error("Validation failed: {0:?}")]
    Validation(Vec<FieldError>),

    /// Missing or insufficient session.
    #[error("Unauthorized")]
    Unauthorized,

    /// Entity absent, or not owned by the caller.
    #[error("Not found: {0}")]
    NotFound(String),

    /// One-time token does not exist (never issued, or already consumed).
    #[error("Token not found")]
    TokenNotFound,

    /// One-time token exists but is past its expiry.
    #[error("Token expired")]
    TokenExpired,

    /// Login attempted before the email address was verified.
    #[error("Email not verified")]
    EmailNotVerified,

    /// No account is registered under the given email.
    #[error("Email not found")]
    EmailNotFound,

    /// Unknown account or wrong password at login.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Session provider failed for a reason other than bad credentials.
    #[error("Authentication failure: {0}")]
    AuthFailure(String),

    /// Account has been banned by an administrator.
    #[error("Account banned")]
    AccountBanned,

    /// Current password did not match on password change.
    #[error("Incorrect password")]
    IncorrectPassword,

    /// Request body above the route's size limit.
    #[error("Payload too large")]
    PayloadTooLarge,

    /// Uniqueness or state-transition violation.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// External collaborator (mail, storage) failed.
    #[error("Upstream failure: {0}")]
    Upstream(String),

    /// Configuration error during startup or environment loading.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error (unexpected failures).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::TokenNotFound
            | AppError::TokenExpired
            | AppError::IncorrectPassword => StatusCode::BAD_REQUEST,
            AppError::Unauthorized | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::EmailNotVerified | AppError::AccountBanned => StatusCode::FORBIDDEN,
            AppError::NotFound(_) | AppError::EmailNotFound => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::AuthFailure(_) | AppError::Config(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable machine-readable code (the variant name).
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "Validation",
            AppError::Unauthorized => "Unauthorized",
            AppError::NotFound(_) => "NotFound",
            AppError::TokenNotFound => "TokenNotFound",
            AppError::TokenExpired => "TokenExpired",
            AppError::EmailNotVerified => "EmailNotVerified",
            AppError::EmailNotFound => "EmailNotFound",
            AppError::InvalidCredentials => "InvalidCredentials",
            AppError::AuthFailure(_) => "AuthFailure",
            AppError::AccountBanned => "AccountBanned",
            AppError::IncorrectPassword => "IncorrectPassword",
            AppError::PayloadTooLarge => "PayloadTooLarge",
            AppError::Conflict(_) => "Conflict",
            AppError::Upstream(_) => "Upstream",
            AppError::Config(_) => "Config",
            AppError::Internal(_) => "Internal",
        }
    }

    /// Get a user-friendly error message.
    ///
    /// Server-side variants return a generic message so internal details never reach clients.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(_) => "Invalid fields".to_string(),
            AppError::Unauthorized => "Unauthorized".to_string(),
            AppError::NotFound(msg) | AppError::Conflict(msg) => msg.clone(),
            AppError::TokenNotFound => "Token does not exist".to_string(),
            AppError::TokenExpired => "Token has expired".to_string(),
            AppError::EmailNotVerified => {
                "Email not verified. Please verify your email before signing in".to_string()
            }
            AppError::EmailNotFound => "Email not found".to_string(),
            AppError::InvalidCredentials => "Invalid credentials".to_string(),
            AppError::AccountBanned => "Account has been suspended".to_string(),
            AppError::IncorrectPassword => "Current password is incorrect".to_string(),
            AppError::PayloadTooLarge => "Request body is too large".to_string(),
            AppError::Upstream(_) => "Service temporarily unavailable".to_string(),
            AppError::AuthFailure(_) | AppError::Config(_) | AppError::Internal(_) => {
                "Something went wrong".to_string()
            }
        }
    }

    /// Shorthand for a single-field validation error.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation(vec![FieldError::new(field, message)])
    }
}

/// Implement Axum's `IntoResponse` for automatic error handling.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("Server error: {}", self);
        } else {
            tracing::debug!("Client error: {}", self);
        }

        let mut body = json!({
            "error": self.user_message(),
            "code": self.code(),
        });
        if let AppError::Validation(fields) = &self {
            body["fields"] = json!(fields);
        }

        (status, Json(body)).into_response()
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Convert `sqlx::Error` to `AppError`.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db_err) => {
                AppError::Internal(format!("Database error: {}", db_err.message()))
            }
            _ => AppError::Internal(format!("Database error: {}", err)),
        }
    }
}

/// Convert `serde_json::Error` to `AppError`.
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_detail_is_hidden() {
        let err = AppError::Internal("constraint failed: accounts.email".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.user_message(), "Something went wrong");
    }

    #[test]
    fn test_lifecycle_status_codes() {
        assert_eq!(AppError::TokenNotFound.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::EmailNotVerified.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Upstream("smtp".into()).status_code(), StatusCode::BAD_GATEWAY);
    }
}
