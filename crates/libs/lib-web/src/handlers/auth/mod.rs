//! # Authentication Handlers
//!
//! HTTP request handlers for the account lifecycle.
//!
//! ## Overview
//!
//! - Registration and email verification (with resend)
//! - Login with email/password, issuing a JWT session token
//! - Forgotten password reset via emailed one-time token
//! - Password change for a signed-in account
//!
//! ## Example
//!
//! ```rust,ignore
//! use axum::{Router, routing::post};
//! use lib_web::handlers::auth::{register, login};
//!
//! let app = Router::new()
//!     .route("/api/auth/register", post(register))
//!     .route("/api/auth/login", post(login))
//!     .with_state(state);
//! ```

use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use lib_core::dto::{
    AccountView, AuthResponse, ChangePasswordRequest, EmailRequest, LoginRequest, MessageResponse,
    RegisterRequest, ResetPasswordRequest, VerifyEmailRequest,
};
use lib_core::{Ctx, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::services::AccountService;

/// Response of a successful registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub account: AccountView,
    pub message: String,
}

/// Register a new account.
///
/// **Route**: `POST /api/auth/register`
///
/// # Returns
///
/// Success (201): the unverified account. A verification link is emailed.
///
/// Error (400): `Validation` with every failing field
/// Error (409): email already registered
/// Error (502): the verification email could not be sent
#[instrument(skip(service, req), fields(email = %req.email))]
pub async fn register(
    State(service): State<AccountService>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    info!("[REGISTER] New registration request");
    let account = service.register(req).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            account,
            message: "Account created. Check your email to verify your address".to_string(),
        }),
    ))
}

/// Redeem an email verification token.
///
/// **Route**: `POST /api/auth/verify-email`
///
/// Error (400): `TokenNotFound` (unknown or already used) or `TokenExpired`
#[instrument(skip_all)]
pub async fn verify_email(
    State(service): State<AccountService>,
    Json(req): Json<VerifyEmailRequest>,
) -> Result<Json<MessageResponse>> {
    service.verify_email(&req.token).await?;
    Ok(Json(MessageResponse::new("Email verified. You can now sign in")))
}

/// **Route**: `POST /api/auth/resend-verification`
#[instrument(skip(service, req), fields(email = %req.email))]
pub async fn resend_verification(
    State(service): State<AccountService>,
    Json(req): Json<EmailRequest>,
) -> Result<Json<MessageResponse>> {
    service.resend_verification(req).await?;
    Ok(Json(MessageResponse::new("Verification email sent")))
}

/// Login with email and password.
///
/// **Route**: `POST /api/auth/login`
///
/// # Returns
///
/// Success (200): `AuthResponse` with the session token and account view
///
/// Error (401): `InvalidCredentials`
/// Error (403): `EmailNotVerified` or `AccountBanned`
#[instrument(skip(service, req), fields(email = %req.email))]
pub async fn login(
    State(service): State<AccountService>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let response = service.login(req).await?;
    info!("[LOGIN] Account {} signed in", response.account.id);
    Ok(Json(response))
}

/// Email a password reset link.
///
/// **Route**: `POST /api/auth/forgot-password`
#[instrument(skip(service, req), fields(email = %req.email))]
pub async fn forgot_password(
    State(service): State<AccountService>,
    Json(req): Json<EmailRequest>,
) -> Result<Json<MessageResponse>> {
    service.request_password_reset(req).await?;
    Ok(Json(MessageResponse::new("Password reset email sent")))
}

/// **Route**: `POST /api/auth/reset-password`
#[instrument(skip_all)]
pub async fn reset_password(
    State(service): State<AccountService>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>> {
    service.reset_password(req).await?;
    Ok(Json(MessageResponse::new("Password has been reset. You can now sign in")))
}

/// Change the password of the signed-in account.
///
/// **Route**: `POST /api/auth/change-password`
///
/// Error (401): no session
/// Error (400): `IncorrectPassword` when the current password does not match
#[instrument(skip_all)]
pub async fn change_password(
    State(service): State<AccountService>,
    ctx: Option<Ctx>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>> {
    service.change_password(ctx.as_ref(), req).await?;
    Ok(Json(MessageResponse::new("Password changed")))
}

#[cfg(test)]
pub(crate) mod tests;
