//! # Authentication Library
//!
//! Password hashing, session (JWT) tokens and one-time email tokens.

pub mod error;
pub mod onetime;
pub mod pwd;
pub mod token;

// Re-export commonly used types
pub use error::{Error, Result};
pub use onetime::{generate_token, token_expiry};
pub use pwd::{hash_password, verify_password};
pub use token::{decode_jwt, encode_jwt, Claims};
