//! # Order Repository
//!
//! Orders are addressed by their human id (`CD-YYMMDD-XXXXXX`) everywhere
//! outside this module. The unique index on `human_id` is what rejects
//! colliding ids; callers detect that with
//! [`is_unique_violation`](super::is_unique_violation) and retry.

use chrono::{DateTime, Utc};
use sqlx::query_as;

use super::models::{Order, OrderForCreate, OrderStatus};
use super::DbPool;

pub struct OrderRepository;

impl OrderRepository {
    /// Insert a new PENDING order.
    pub async fn create(pool: &DbPool, data: &OrderForCreate) -> Result<Order, sqlx::Error> {
        let now = Utc::now();

        query_as::<_, Order>(
            r#"
            INSERT INTO orders (
                human_id, account_id, direction, asset, network, fiat_currency,
                crypto_amount, fiat_amount, rate, wallet_id, payment_method_id,
                status, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&data.human_id)
        .bind(data.account_id)
        .bind(data.direction.as_str())
        .bind(&data.asset)
        .bind(&data.network)
        .bind(&data.fiat_currency)
        .bind(data.crypto_amount)
        .bind(data.fiat_amount)
        .bind(data.rate)
        .bind(data.wallet_id)
        .bind(data.payment_method_id)
        .bind(OrderStatus::Pending.as_str())
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_human_id(pool: &DbPool, human_id: &str) -> Result<Option<Order>, sqlx::Error> {
        query_as::<_, Order>("SELECT * FROM orders WHERE human_id = ?")
            .bind(human_id)
            .fetch_optional(pool)
            .await
    }

    /// Orders placed by one account, newest first.
    pub async fn list_for_account(pool: &DbPool, account_id: i64) -> Result<Vec<Order>, sqlx::Error> {
        query_as::<_, Order>(
            "SELECT * FROM orders WHERE account_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(account_id)
        .fetch_all(pool)
        .await
    }

    /// All orders, newest first, optionally narrowed to one status.
    pub async fn list_all(pool: &DbPool, status: Option<OrderStatus>) -> Result<Vec<Order>, sqlx::Error> {
        match status {
            Some(status) => {
                query_as::<_, Order>(
                    "SELECT * FROM orders WHERE status = ? ORDER BY created_at DESC, id DESC",
                )
                .bind(status.as_str())
                .fetch_all(pool)
                .await
            }
            None => {
                query_as::<_, Order>("SELECT * FROM orders ORDER BY created_at DESC, id DESC")
                    .fetch_all(pool)
                    .await
            }
        }
    }

    /// Move an order from `from` to `to`.
    ///
    /// The current status is part of the WHERE clause, so a concurrent change
    /// makes this return `None` instead of overwriting it.
    pub async fn update_status(
        pool: &DbPool,
        id: i64,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<Order>, sqlx::Error> {
        query_as::<_, Order>(
            "UPDATE orders SET status = ?, updated_at = ? WHERE id = ? AND status = ? RETURNING *",
        )
        .bind(to.as_str())
        .bind(Utc::now())
        .bind(id)
        .bind(from.as_str())
        .fetch_optional(pool)
        .await
    }

    /// Orders with `since < created_at <= until`, oldest first.
    pub async fn created_between(
        pool: &DbPool,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Order>, sqlx::Error> {
        query_as::<_, Order>(
            "SELECT * FROM orders WHERE created_at > ? AND created_at <= ? ORDER BY created_at ASC, id ASC",
        )
        .bind(since)
        .bind(until)
        .fetch_all(pool)
        .await
    }

    pub async fn count_by_status(pool: &DbPool, status: OrderStatus) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = query_as("SELECT COUNT(*) FROM orders WHERE status = ?")
            .bind(status.as_str())
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}
