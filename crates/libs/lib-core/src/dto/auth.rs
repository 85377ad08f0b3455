//! # Account Data Transfer Objects
//!
//! Request and response bodies for the account lifecycle:
//!
//! - `POST /api/auth/register` - [`RegisterRequest`] -> [`AccountView`] plus a message (`RegisterResponse` in lib-web)
//! - `POST /api/auth/verify-email` - [`VerifyEmailRequest`]
//! - `POST /api/auth/resend-verification` - [`EmailRequest`]
//! - `POST /api/auth/login` - [`LoginRequest`] -> [`AuthResponse`]
//! - `POST /api/auth/forgot-password` - [`EmailRequest`]
//! - `POST /api/auth/reset-password` - [`ResetPasswordRequest`]
//! - `POST /api/auth/change-password` - [`ChangePasswordRequest`]
//! - `GET|PUT /api/account/profile` - [`UpdateProfileRequest`] -> [`AccountView`]
//! - `POST /api/account/profile/image` - [`ProfileImageRequest`] -> [`AccountView`]
//!
//! ## Wire Format
//!
//! Field names are snake_case. Optional fields are omitted when `None`.
//!
//! ```text
//! POST /api/auth/login
//! {
//!   "email": "ama@example.com",
//!   "password": "Secret!"
//! }
//! ```
//!
//! Response:
//! ```text
//! {
//!   "account": { "id": 1, "email": "ama@example.com", "role": "USER", ... },
//!   "token": "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...",
//!   "message": "Login successful"
//! }
//! ```

use chrono::{DateTime, Utc};
use lib_utils::{validate_email, validate_not_empty, validate_password_strength};
use serde::{Deserialize, Serialize};

use super::FieldErrors;
use crate::error::Result;
use crate::model::store::models::{Account, AccountStatus, Role};

/// Registration form.
///
/// # Validation Rules
///
/// - First and last name must not be blank
/// - Email must be well-formed
/// - Password must be at least 6 characters with an uppercase letter and a
///   special character
/// - `confirm_password` must equal `password`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::default();
        errors.check("first_name", validate_not_empty(&self.first_name, "First name"));
        errors.check("last_name", validate_not_empty(&self.last_name, "Last name"));
        errors.check("email", validate_email(&self.email));
        errors.check("password", validate_password_strength(&self.password));
        if self.password != self.confirm_password {
            errors.push("confirm_password", "Passwords do not match");
        }
        errors.finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerifyEmailRequest {
    pub token: String,
}

impl VerifyEmailRequest {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::default();
        errors.check("token", validate_not_empty(&self.token, "Token"));
        errors.finish()
    }
}

/// Body carrying only an email: resend verification, forgot password.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmailRequest {
    pub email: String,
}

impl EmailRequest {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::default();
        errors.check("email", validate_email(&self.email));
        errors.finish()
    }
}

/// Login credentials.
///
/// Only presence is checked here; strength rules apply at registration, and
/// a malformed email simply fails the lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::default();
        errors.check("email", validate_not_empty(&self.email, "Email"));
        if self.password.is_empty() {
            errors.push("password", "Password cannot be empty");
        }
        errors.finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
    pub confirm_password: String,
}

impl ResetPasswordRequest {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::default();
        errors.check("token", validate_not_empty(&self.token, "Token"));
        errors.check("password", validate_password_strength(&self.password));
        if self.password != self.confirm_password {
            errors.push("confirm_password", "Passwords do not match");
        }
        errors.finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl ChangePasswordRequest {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::default();
        if self.current_password.is_empty() {
            errors.push("current_password", "Current password cannot be empty");
        }
        errors.check("new_password", validate_password_strength(&self.new_password));
        if self.new_password != self.confirm_password {
            errors.push("confirm_password", "Passwords do not match");
        }
        errors.finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateProfileRequest {
    pub first_name: String,
    pub last_name: String,
}

impl UpdateProfileRequest {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::default();
        errors.check("first_name", validate_not_empty(&self.first_name, "First name"));
        errors.check("last_name", validate_not_empty(&self.last_name, "Last name"));
        errors.finish()
    }
}

/// Profile picture upload as base64 (a `data:` URL prefix is accepted).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileImageRequest {
    pub content_type: String,
    pub data: String,
}

/// Returned on successful login.
///
/// The `token` goes into subsequent requests as:
/// ```text
/// Authorization: Bearer <token>
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthResponse {
    pub account: AccountView,
    pub token: String,
    pub message: String,
}

/// Account information safe to send to clients. Never carries the hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountView {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub email_verified: bool,
    pub role: Role,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            image: account.image.clone(),
            email_verified: account.is_verified(),
            role: account.role,
            status: account.status,
            created_at: account.created_at,
            last_login: account.last_login,
        }
    }
}
