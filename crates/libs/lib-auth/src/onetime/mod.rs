//! # One-time Tokens
//!
//! Random tokens mailed for email verification and password reset.
//! Storage, replacement, redemption and the expiry check live in `lib-core`;
//! this module only mints tokens and computes their expiry.

use chrono::{DateTime, Duration, Utc};
use lib_utils::b64u_encode;
use rand::RngCore;

/// Number of random bytes behind each token (256 bits).
const TOKEN_BYTES: usize = 32;

/// Generate a new URL-safe one-time token.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    b64u_encode(bytes)
}

/// Expiry instant for a token issued at `now` and valid for `ttl_minutes`.
pub fn token_expiry(now: DateTime<Utc>, ttl_minutes: i64) -> DateTime<Utc> {
    now + Duration::minutes(ttl_minutes)
}
