//! # Middleware
//!
//! Axum middleware for session resolution, request stamping, logging and
//! response mapping.
//!
//! ## Modules
//!
//! - **[`mw_auth`]**: Bearer session resolution into a `Ctx`
//! - **[`mw_req_stamp`]**: Request ID and timestamp stamping
//! - **[`mw_logging`]**: Request/response logging with redaction
//! - **[`mw_res_map`]**: Server error logging on the way out

// region: --- Modules
pub mod mw_auth;
pub mod mw_logging;
pub mod mw_req_stamp;
pub mod mw_res_map;
// endregion: --- Modules

// region: --- Re-exports
pub use mw_auth::resolve_session;
pub use mw_logging::log_requests;
pub use mw_req_stamp::{stamp_req, RequestStamp};
pub use mw_res_map::map_res;
// endregion: --- Re-exports
