//! # One-time Token Repository
//!
//! Verification and password-reset tokens live in two tables with the same
//! shape; [`TokenKind`] picks the table. Each table has a unique index on
//! `email`, and [`TokenRepository::replace_for_email`] deletes and inserts in
//! one transaction, so at most one live token exists per email and kind.

use chrono::{DateTime, Utc};
use sqlx::{query_as, Sqlite, Transaction};

use super::models::OneTimeToken;
use super::DbPool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Verification,
    PasswordReset,
}

impl TokenKind {
    fn table(self) -> &'static str {
        match self {
            TokenKind::Verification => "verification_tokens",
            TokenKind::PasswordReset => "password_reset_tokens",
        }
    }
}

pub struct TokenRepository;

impl TokenRepository {
    /// Drop any token issued to `email` and store `token` in its place.
    pub async fn replace_for_email(
        pool: &DbPool,
        kind: TokenKind,
        email: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<OneTimeToken, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(&format!("DELETE FROM {} WHERE email = ?", kind.table()))
            .bind(email)
            .execute(&mut *tx)
            .await?;

        let stored = query_as::<_, OneTimeToken>(&format!(
            "INSERT INTO {} (email, token, expires_at, created_at) VALUES (?, ?, ?, ?) RETURNING *",
            kind.table()
        ))
        .bind(email)
        .bind(token)
        .bind(expires_at)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(stored)
    }

    pub async fn find_by_token(
        pool: &DbPool,
        kind: TokenKind,
        token: &str,
    ) -> Result<Option<OneTimeToken>, sqlx::Error> {
        query_as::<_, OneTimeToken>(&format!("SELECT * FROM {} WHERE token = ?", kind.table()))
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_email(
        pool: &DbPool,
        kind: TokenKind,
        email: &str,
    ) -> Result<Option<OneTimeToken>, sqlx::Error> {
        query_as::<_, OneTimeToken>(&format!("SELECT * FROM {} WHERE email = ?", kind.table()))
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Delete a token inside the caller's transaction.
    ///
    /// Returns `false` when the row was already gone, which means another
    /// request redeemed it first.
    pub async fn consume(
        tx: &mut Transaction<'_, Sqlite>,
        kind: TokenKind,
        id: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", kind.table()))
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Remove every token that expired before `now`. Returns the number removed.
    pub async fn delete_expired(
        pool: &DbPool,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE expires_at < ?", kind.table()))
            .bind(now)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
