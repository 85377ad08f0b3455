//! # Web Library
//!
//! HTTP handlers, middleware, services, mail and upload storage for the
//! exchange backend.

pub mod handlers;
pub mod mail;
pub mod middleware;
pub mod server;
pub mod services;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;

pub use server::{api_router, create_router, start_server, AppState, ServerConfig};
