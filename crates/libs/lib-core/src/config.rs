//! # Application Configuration
//!
//! This module manages application configuration loaded from environment variables.
//! All configuration is validated on startup to fail fast if misconfigured.
//!
//! The configuration is built once by the process entry point and handed to
//! the web layer through its state; there is no global instance.

use lib_utils::{get_env, get_env_or, get_env_parse_or};

use crate::error::{AppError, Result};

/// Application configuration loaded from environment variables.
#[derive(Clone, Debug)]
pub struct Config {
    /// SQLite database connection URL
    pub database_url: String,

    /// Secret key for JWT token signing and verification
    ///
    /// **Must be at least 32 characters long** for security.
    pub jwt_secret: String,

    /// JWT token validity period in hours (1-720)
    pub jwt_expiration_hours: i64,

    /// Public base URL of the web app, used to build links in emails
    pub app_url: String,

    /// Lifetime of email verification tokens
    pub verification_token_ttl_minutes: i64,

    /// Lifetime of password reset tokens
    pub reset_token_ttl_minutes: i64,

    /// How many human order ids to try before giving up on a collision streak
    pub order_id_max_attempts: u32,

    /// Directory backing the local object store
    pub upload_dir: String,

    /// Base URL under which stored objects are reachable
    pub upload_public_url: String,

    pub mail: MailConfig,
}

/// Outbound mail settings.
#[derive(Clone, Debug)]
pub struct MailConfig {
    /// Brevo API key; when absent mails are only logged
    pub brevo_api_key: Option<String>,
    pub sender_email: String,
    pub sender_name: String,
    /// Upper bound for a single send request
    pub timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables (and `.env`, if present).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = get_env_or("DATABASE_URL", "sqlite:data/exchange.db");

        let jwt_secret = get_env("JWT_SECRET")
            .map_err(|_| AppError::Config("JWT_SECRET must be set in environment".to_string()))?;

        let brevo_api_key = get_env("BREVO_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expiration_hours: parse_or("JWT_EXPIRATION_HOURS", 24)?,
            app_url: get_env_or("APP_URL", "http://localhost:3000")
                .trim_end_matches('/')
                .to_string(),
            verification_token_ttl_minutes: parse_or("VERIFICATION_TOKEN_TTL_MINUTES", 60)?,
            reset_token_ttl_minutes: parse_or("RESET_TOKEN_TTL_MINUTES", 60)?,
            order_id_max_attempts: parse_or("ORDER_ID_MAX_ATTEMPTS", 5)?,
            upload_dir: get_env_or("UPLOAD_DIR", "data/uploads"),
            upload_public_url: get_env_or("UPLOAD_PUBLIC_URL", "http://localhost:3001/uploads")
                .trim_end_matches('/')
                .to_string(),
            mail: MailConfig {
                brevo_api_key,
                sender_email: get_env_or("MAIL_SENDER_EMAIL", "no-reply@localhost"),
                sender_name: get_env_or("MAIL_SENDER_NAME", "Exchange"),
                timeout_secs: parse_or("MAIL_TIMEOUT_SECS", 10)?,
            },
        })
    }

    /// Validate configuration values against security and business rules.
    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.len() < 32 {
            return Err(AppError::Config(
                "JWT_SECRET must be at least 32 characters long".to_string(),
            ));
        }

        if self.jwt_expiration_hours < 1 || self.jwt_expiration_hours > 720 {
            return Err(AppError::Config(
                "JWT_EXPIRATION_HOURS must be between 1 and 720 (30 days)".to_string(),
            ));
        }

        if self.verification_token_ttl_minutes < 1 || self.reset_token_ttl_minutes < 1 {
            return Err(AppError::Config(
                "Token TTLs must be at least one minute".to_string(),
            ));
        }

        if self.order_id_max_attempts == 0 {
            return Err(AppError::Config(
                "ORDER_ID_MAX_ATTEMPTS must be at least 1".to_string(),
            ));
        }

        if self.mail.timeout_secs == 0 {
            return Err(AppError::Config("MAIL_TIMEOUT_SECS must be positive".to_string()));
        }

        Ok(())
    }
}

fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T> {
    get_env_parse_or(name, default)
        .map_err(|_| AppError::Config(format!("{name} must be a valid number")))
}
