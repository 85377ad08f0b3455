//! # Wallet Repository
//!
//! Customer payout wallets. A wallet is keyed by (account, asset, network,
//! name); saving the same key again updates the address. At most one wallet
//! per (account, asset) carries `is_default`.

use chrono::Utc;
use sqlx::query_as;

use super::models::{Wallet, WalletForUpsert};
use super::DbPool;

pub struct WalletRepository;

impl WalletRepository {
    /// Insert or update a wallet, clearing other defaults for the same asset
    /// in the same transaction when `is_default` is set.
    pub async fn upsert(pool: &DbPool, data: WalletForUpsert) -> Result<Wallet, sqlx::Error> {
        let now = Utc::now();
        let mut tx = pool.begin().await?;

        if data.is_default {
            sqlx::query(
                "UPDATE wallets SET is_default = 0, updated_at = ? WHERE account_id = ? AND asset = ? AND is_default = 1",
            )
            .bind(now)
            .bind(data.account_id)
            .bind(&data.asset)
            .execute(&mut *tx)
            .await?;
        }

        let wallet = query_as::<_, Wallet>(
            r#"
            INSERT INTO wallets (account_id, asset, network, name, address, is_default, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (account_id, asset, network, name)
            DO UPDATE SET address = excluded.address, is_default = excluded.is_default, updated_at = excluded.updated_at
            RETURNING *
            "#,
        )
        .bind(data.account_id)
        .bind(&data.asset)
        .bind(&data.network)
        .bind(&data.name)
        .bind(&data.address)
        .bind(data.is_default)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(wallet)
    }

    pub async fn list_for_account(pool: &DbPool, account_id: i64) -> Result<Vec<Wallet>, sqlx::Error> {
        query_as::<_, Wallet>(
            "SELECT * FROM wallets WHERE account_id = ? ORDER BY asset, is_default DESC, name",
        )
        .bind(account_id)
        .fetch_all(pool)
        .await
    }

    /// Find a wallet only if it belongs to `account_id`.
    pub async fn find_owned(pool: &DbPool, id: i64, account_id: i64) -> Result<Option<Wallet>, sqlx::Error> {
        query_as::<_, Wallet>("SELECT * FROM wallets WHERE id = ? AND account_id = ?")
            .bind(id)
            .bind(account_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a wallet owned by `account_id`. Returns `false` when nothing matched.
    pub async fn delete_owned(pool: &DbPool, id: i64, account_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM wallets WHERE id = ? AND account_id = ?")
            .bind(id)
            .bind(account_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
