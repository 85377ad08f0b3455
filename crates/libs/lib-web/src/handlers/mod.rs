//! # HTTP Request Handlers
//!
//! Axum handlers organized by feature domain. Handlers are thin: they
//! extract the session and body, call one service method and wrap the result.
//! Business rules live in [`crate::services`].
//!
//! ## Handler Modules
//!
//! - **[`auth`]**: account lifecycle
//!   - `POST /api/auth/register`, `/verify-email`, `/resend-verification`
//!   - `POST /api/auth/login`
//!   - `POST /api/auth/forgot-password`, `/reset-password`, `/change-password`
//!
//! - **[`account`]**: profile of the signed-in account
//!   - `GET|PUT /api/account/profile`, `POST /api/account/profile/image`
//!
//! - **[`orders`]**: customer orders
//!   - `GET|POST /api/orders`, `GET /api/orders/{id}`
//!
//! - **[`kyc`]**: identity verification
//!   - `GET|POST /api/kyc`
//!
//! - **[`wallets`]**: payout destinations
//!   - `GET|POST /api/wallets`, `DELETE /api/wallets/{id}`
//!   - `GET|POST /api/payment-methods`, `PUT|DELETE /api/payment-methods/{id}`
//!
//! - **[`admin`]**: back office under `/api/admin/...`
//!
//! ## Handler Architecture
//!
//! ```rust,ignore
//! async fn handler(
//!     State(service): State<OrderService>,   // service built from AppState via FromRef
//!     ctx: Ctx,                              // session required (401 otherwise)
//!     Json(payload): Json<RequestBody>,      // request body
//! ) -> lib_core::Result<Json<Response>> {
//!     Ok(Json(service.operation(&ctx, payload).await?))
//! }
//! ```
//!
//! Errors are `AppError` values, rendered as `{ "error", "code", "fields"? }`.

pub mod account;
pub mod admin;
pub mod auth;
pub mod kyc;
pub mod orders;
pub mod wallets;
