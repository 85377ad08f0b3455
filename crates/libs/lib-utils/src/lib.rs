//! # Utilities Library
//!
//! Shared utility functions for base64 decoding, environment variables and input validation.

pub mod b64;
pub mod envs;
pub mod validation;

// Re-export commonly used functions
pub use b64::{b64_decode, b64u_decode, b64u_encode};
pub use envs::{get_env, get_env_or, get_env_parse_or};
pub use validation::{
    normalize_email, validate_currency_code, validate_email, validate_min_length,
    validate_not_empty, validate_password_strength, validate_positive_amount,
};
