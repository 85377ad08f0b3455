//! # Payment Method Repository
//!
//! Fiat payout destinations (mobile money or bank account). At most one
//! payment method per account is the default.

use chrono::{DateTime, Utc};
use sqlx::{query_as, Sqlite, Transaction};

use super::models::{PaymentMethod, PaymentMethodForSave};
use super::DbPool;

pub struct PaymentMethodRepository;

impl PaymentMethodRepository {
    pub async fn create(
        pool: &DbPool,
        account_id: i64,
        data: PaymentMethodForSave,
    ) -> Result<PaymentMethod, sqlx::Error> {
        let now = Utc::now();
        let mut tx = pool.begin().await?;

        if data.is_default {
            Self::clear_default(&mut tx, account_id, now).await?;
        }

        let method = query_as::<_, PaymentMethod>(
            r#"
            INSERT INTO payment_methods (account_id, method_type, provider, account_name, account_number, label, is_default, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(account_id)
        .bind(data.method_type.as_str())
        .bind(&data.provider)
        .bind(&data.account_name)
        .bind(&data.account_number)
        .bind(&data.label)
        .bind(data.is_default)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(method)
    }

    /// Overwrite a payment method owned by `account_id`.
    ///
    /// Returns `None` when the row does not exist or belongs to someone else.
    pub async fn update_owned(
        pool: &DbPool,
        id: i64,
        account_id: i64,
        data: PaymentMethodForSave,
    ) -> Result<Option<PaymentMethod>, sqlx::Error> {
        let now = Utc::now();
        let mut tx = pool.begin().await?;

        if data.is_default {
            Self::clear_default(&mut tx, account_id, now).await?;
        }

        let method = query_as::<_, PaymentMethod>(
            r#"
            UPDATE payment_methods
            SET method_type = ?, provider = ?, account_name = ?, account_number = ?, label = ?, is_default = ?, updated_at = ?
            WHERE id = ? AND account_id = ?
            RETURNING *
            "#,
        )
        .bind(data.method_type.as_str())
        .bind(&data.provider)
        .bind(&data.account_name)
        .bind(&data.account_number)
        .bind(&data.label)
        .bind(data.is_default)
        .bind(now)
        .bind(id)
        .bind(account_id)
        .fetch_optional(&mut *tx)
        .await?;

        // Dropping the transaction rolls back the cleared default.
        if method.is_some() {
            tx.commit().await?;
        }
        Ok(method)
    }

    pub async fn list_for_account(pool: &DbPool, account_id: i64) -> Result<Vec<PaymentMethod>, sqlx::Error> {
        query_as::<_, PaymentMethod>(
            "SELECT * FROM payment_methods WHERE account_id = ? ORDER BY is_default DESC, created_at DESC, id DESC",
        )
        .bind(account_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_owned(pool: &DbPool, id: i64, account_id: i64) -> Result<Option<PaymentMethod>, sqlx::Error> {
        query_as::<_, PaymentMethod>("SELECT * FROM payment_methods WHERE id = ? AND account_id = ?")
            .bind(id)
            .bind(account_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete_owned(pool: &DbPool, id: i64, account_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM payment_methods WHERE id = ? AND account_id = ?")
            .bind(id)
            .bind(account_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear_default(
        tx: &mut Transaction<'_, Sqlite>,
        account_id: i64,
        now: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE payment_methods SET is_default = 0, updated_at = ? WHERE account_id = ? AND is_default = 1",
        )
        .bind(now)
        .bind(account_id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
