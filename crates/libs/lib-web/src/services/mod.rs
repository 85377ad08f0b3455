//! # Services Layer
//!
//! Business logic between the HTTP handlers and the repositories:
//!
//! ```text
//! Handlers (HTTP) → Services (Business Logic) → Repositories / Mailer / ObjectStore
//! ```
//!
//! ## Module Organization
//!
//! - [`account`] - registration, verification, login, passwords, profile
//! - [`order`] - order placement, details, admin status changes
//! - [`kyc`] - identity submissions and review
//! - [`notification`] - admin "new since" poller
//! - [`wallet`] - wallets, payment methods, admin deposit wallets
//! - [`admin`] - account administration and dashboard counts
//!
//! ## Service Pattern
//!
//! Services are cheap `Clone` structs holding their dependencies (`DbPool`,
//! `Arc<dyn Mailer>`, `Arc<dyn ObjectStore>`). Handlers receive them through
//! `State<...>` via the `FromRef` impls on `AppState`:
//!
//! ```rust,ignore
//! async fn list(State(service): State<OrderService>, ctx: Ctx) -> Result<Json<Vec<OrderView>>> {
//!     Ok(Json(service.list_orders(&ctx).await?))
//! }
//! ```
//!
//! ## Error Handling
//!
//! All services return `lib_core::Result<T>`. Repository errors convert into
//! `AppError::Internal`; collaborator failures into `AppError::Upstream`.

pub mod account;
pub mod admin;
pub mod kyc;
pub mod notification;
pub mod order;
pub mod wallet;

// Re-export services for convenience
pub use account::AccountService;
pub use admin::AdminService;
pub use kyc::KycService;
pub use notification::NotificationService;
pub use order::OrderService;
pub use wallet::WalletService;
