//! # Core Library
//!
//! Core models, database, configuration, request context and DTO schemas.

pub mod config;
pub mod ctx;
pub mod dto;
pub mod error;
pub mod model;

// Re-export commonly used types
pub use config::{Config, MailConfig};
pub use ctx::Ctx;
pub use error::{AppError, FieldError, Result};
pub use model::store::{create_memory_pool, create_pool, migrate, DbPool};
