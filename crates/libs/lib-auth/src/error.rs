//! # Auth Errors

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to hash password: {0}")]
    PwdHash(String),

    #[error("Failed to parse password hash: {0}")]
    PwdParse(String),

    #[error("Failed to encode JWT: {0}")]
    JwtEncode(String),

    #[error("Failed to decode JWT: {0}")]
    JwtDecode(String),
}
