//! # Admin Wallet Repository
//!
//! Platform deposit addresses. A partial unique index allows only one
//! active address per currency; activation deactivates the previous one in
//! the same transaction.

use chrono::{DateTime, Utc};
use sqlx::{query_as, Sqlite, Transaction};

use super::models::{AdminWallet, AdminWalletForUpsert};
use super::DbPool;

pub struct AdminWalletRepository;

impl AdminWalletRepository {
    /// Insert or update the (chain, currency, address) row.
    pub async fn upsert(pool: &DbPool, data: AdminWalletForUpsert) -> Result<AdminWallet, sqlx::Error> {
        let now = Utc::now();
        let mut tx = pool.begin().await?;

        if data.is_active {
            Self::deactivate_currency(&mut tx, &data.currency, now).await?;
        }

        let wallet = query_as::<_, AdminWallet>(
            r#"
            INSERT INTO admin_wallets (chain, currency, address, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (chain, currency, address)
            DO UPDATE SET is_active = excluded.is_active, updated_at = excluded.updated_at
            RETURNING *
            "#,
        )
        .bind(&data.chain)
        .bind(&data.currency)
        .bind(&data.address)
        .bind(data.is_active)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(wallet)
    }

    /// Toggle one address. Returns `None` when `id` is unknown.
    pub async fn set_active(pool: &DbPool, id: i64, active: bool) -> Result<Option<AdminWallet>, sqlx::Error> {
        let now = Utc::now();
        let mut tx = pool.begin().await?;

        let Some(existing) = query_as::<_, AdminWallet>("SELECT * FROM admin_wallets WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        if active {
            Self::deactivate_currency(&mut tx, &existing.currency, now).await?;
        }

        let wallet = query_as::<_, AdminWallet>(
            "UPDATE admin_wallets SET is_active = ?, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(active)
        .bind(now)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(wallet))
    }

    pub async fn list(pool: &DbPool) -> Result<Vec<AdminWallet>, sqlx::Error> {
        query_as::<_, AdminWallet>(
            "SELECT * FROM admin_wallets ORDER BY currency, is_active DESC, chain",
        )
        .fetch_all(pool)
        .await
    }

    /// The deposit address currently accepting payments in `currency`.
    pub async fn find_active_by_currency(
        pool: &DbPool,
        currency: &str,
    ) -> Result<Option<AdminWallet>, sqlx::Error> {
        query_as::<_, AdminWallet>(
            "SELECT * FROM admin_wallets WHERE currency = ? AND is_active = 1",
        )
        .bind(currency)
        .fetch_optional(pool)
        .await
    }

    async fn deactivate_currency(
        tx: &mut Transaction<'_, Sqlite>,
        currency: &str,
        now: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE admin_wallets SET is_active = 0, updated_at = ? WHERE currency = ? AND is_active = 1",
        )
        .bind(now)
        .bind(currency)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
