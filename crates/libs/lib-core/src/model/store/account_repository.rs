//! # Account Repository
//!
//! Provides database access layer for account-related operations.
//!
//! Emails are expected to be normalized (trimmed, lowercased) by the caller;
//! the repository compares them verbatim.
//!
//! ## Example
//!
//! ```rust,no_run
//! # use lib_core::model::store::{AccountRepository, models::AccountForCreate};
//! # async fn example() -> anyhow::Result<()> {
//! let pool = lib_core::create_memory_pool().await?;
//!
//! let account = AccountRepository::create(&pool, AccountForCreate {
//!     email: "ama@example.com".to_string(),
//!     password_hash: "$argon2id$...".to_string(),
//!     first_name: "Ama".to_string(),
//!     last_name: "Mensah".to_string(),
//! }).await?;
//!
//! let found = AccountRepository::find_by_email(&pool, "ama@example.com").await?;
//! assert_eq!(found.map(|a| a.id), Some(account.id));
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use sqlx::query_as;

use super::models::{Account, AccountForCreate, AccountForUpdate, AccountStatus, Role};
use super::DbPool;

/// Account repository for database operations.
pub struct AccountRepository;

impl AccountRepository {
    /// Find an account by its email address.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Account))` - Account found with matching email
    /// * `Ok(None)` - No account registered under that email
    /// * `Err(sqlx::Error)` - Database error occurred
    pub async fn find_by_email(pool: &DbPool, email: &str) -> Result<Option<Account>, sqlx::Error> {
        query_as::<_, Account>("SELECT * FROM accounts WHERE email = ?")
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Find an account by its id.
    pub async fn find_by_id(pool: &DbPool, id: i64) -> Result<Option<Account>, sqlx::Error> {
        query_as::<_, Account>("SELECT * FROM accounts WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Create a new, unverified account with role `USER` and status `ACTIVE`.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if:
    /// - Email already exists (UNIQUE constraint violation)
    /// - Database connection fails
    pub async fn create(pool: &DbPool, data: AccountForCreate) -> Result<Account, sqlx::Error> {
        let now = Utc::now();

        query_as::<_, Account>(
            r#"
            INSERT INTO accounts (email, password_hash, first_name, last_name, role, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(Role::User.as_str())
        .bind(AccountStatus::Active.as_str())
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    /// Update an existing account using `AccountForUpdate`.
    ///
    /// Only fields that are `Some` in `data` will be updated. Returns `None`
    /// when no account has that id.
    pub async fn update(
        pool: &DbPool,
        id: i64,
        data: AccountForUpdate,
    ) -> Result<Option<Account>, sqlx::Error> {
        if data.is_empty() {
            return Self::find_by_id(pool, id).await;
        }

        // Build update query dynamically
        let mut updates = Vec::new();

        if data.first_name.is_some() {
            updates.push("first_name = ?");
        }
        if data.last_name.is_some() {
            updates.push("last_name = ?");
        }
        if data.image.is_some() {
            updates.push("image = ?");
        }
        if data.password_hash.is_some() {
            updates.push("password_hash = ?");
        }
        if data.role.is_some() {
            updates.push("role = ?");
        }
        if data.status.is_some() {
            updates.push("status = ?");
        }
        updates.push("updated_at = ?");

        let query_str = format!(
            "UPDATE accounts SET {} WHERE id = ? RETURNING *",
            updates.join(", ")
        );

        let mut query = query_as::<_, Account>(&query_str);

        if let Some(ref first_name) = data.first_name {
            query = query.bind(first_name);
        }
        if let Some(ref last_name) = data.last_name {
            query = query.bind(last_name);
        }
        if let Some(ref image) = data.image {
            query = query.bind(image);
        }
        if let Some(ref password_hash) = data.password_hash {
            query = query.bind(password_hash);
        }
        if let Some(role) = data.role {
            query = query.bind(role.as_str());
        }
        if let Some(status) = data.status {
            query = query.bind(status.as_str());
        }

        query.bind(Utc::now()).bind(id).fetch_optional(pool).await
    }

    /// Update the last login timestamp for an account.
    ///
    /// This method does not verify that the account exists.
    pub async fn update_last_login(pool: &DbPool, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE accounts SET last_login = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Stamp the email as verified at `at`, unless it already is.
    ///
    /// Runs on any executor so it can join the token redemption transaction.
    /// Returns the number of rows changed (0 when already verified).
    pub async fn mark_email_verified<'e, E>(
        executor: E,
        email: &str,
        at: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        let result = sqlx::query(
            "UPDATE accounts SET email_verified_at = ?, updated_at = ? WHERE email = ? AND email_verified_at IS NULL",
        )
        .bind(at)
        .bind(at)
        .bind(email)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// Replace the password hash of the account registered under `email`.
    pub async fn set_password_by_email<'e, E>(
        executor: E,
        email: &str,
        password_hash: &str,
    ) -> Result<u64, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        let result =
            sqlx::query("UPDATE accounts SET password_hash = ?, updated_at = ? WHERE email = ?")
                .bind(password_hash)
                .bind(Utc::now())
                .bind(email)
                .execute(executor)
                .await?;
        Ok(result.rows_affected())
    }

    /// List accounts, newest first.
    pub async fn list(pool: &DbPool, limit: i64, offset: i64) -> Result<Vec<Account>, sqlx::Error> {
        query_as::<_, Account>("SELECT * FROM accounts ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?")
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count all accounts.
    pub async fn count(pool: &DbPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = query_as("SELECT COUNT(*) FROM accounts")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}
