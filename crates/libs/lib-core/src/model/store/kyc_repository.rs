//! # KYC Repository
//!
//! One submission row per account (`account_id` is UNIQUE). A rejected
//! submission is overwritten in place by [`KycRepository::resubmit`] rather
//! than creating a second row.

use chrono::{DateTime, Utc};
use sqlx::query_as;
use sqlx::types::Json;

use super::models::{KycForSubmit, KycStatus, KycSubmission};
use super::DbPool;

pub struct KycRepository;

impl KycRepository {
    pub async fn find_by_account(pool: &DbPool, account_id: i64) -> Result<Option<KycSubmission>, sqlx::Error> {
        query_as::<_, KycSubmission>("SELECT * FROM kyc_submissions WHERE account_id = ?")
            .bind(account_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id(pool: &DbPool, id: i64) -> Result<Option<KycSubmission>, sqlx::Error> {
        query_as::<_, KycSubmission>("SELECT * FROM kyc_submissions WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert the first submission of an account as PENDING.
    pub async fn create(pool: &DbPool, data: KycForSubmit) -> Result<KycSubmission, sqlx::Error> {
        let now = Utc::now();

        query_as::<_, KycSubmission>(
            r#"
            INSERT INTO kyc_submissions (account_id, id_type, id_number, document_urls, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(data.account_id)
        .bind(data.id_type.as_str())
        .bind(&data.id_number)
        .bind(Json(&data.document_urls))
        .bind(KycStatus::Pending.as_str())
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    /// Replace a REJECTED submission and put it back to PENDING.
    ///
    /// `created_at` is refreshed so the resubmission shows up as a new event
    /// for the admin poller. Returns `None` if the stored row is not REJECTED.
    pub async fn resubmit(pool: &DbPool, data: KycForSubmit) -> Result<Option<KycSubmission>, sqlx::Error> {
        let now = Utc::now();

        query_as::<_, KycSubmission>(
            r#"
            UPDATE kyc_submissions
            SET id_type = ?, id_number = ?, document_urls = ?, status = ?,
                rejection_reason = NULL, reviewed_at = NULL, created_at = ?, updated_at = ?
            WHERE account_id = ? AND status = ?
            RETURNING *
            "#,
        )
        .bind(data.id_type.as_str())
        .bind(&data.id_number)
        .bind(Json(&data.document_urls))
        .bind(KycStatus::Pending.as_str())
        .bind(now)
        .bind(now)
        .bind(data.account_id)
        .bind(KycStatus::Rejected.as_str())
        .fetch_optional(pool)
        .await
    }

    /// Record an admin decision on a PENDING submission.
    ///
    /// Returns `None` when the submission is missing or no longer PENDING.
    pub async fn review(
        pool: &DbPool,
        id: i64,
        decision: KycStatus,
        rejection_reason: Option<&str>,
    ) -> Result<Option<KycSubmission>, sqlx::Error> {
        let now = Utc::now();

        query_as::<_, KycSubmission>(
            r#"
            UPDATE kyc_submissions
            SET status = ?, rejection_reason = ?, reviewed_at = ?, updated_at = ?
            WHERE id = ? AND status = ?
            RETURNING *
            "#,
        )
        .bind(decision.as_str())
        .bind(rejection_reason)
        .bind(now)
        .bind(now)
        .bind(id)
        .bind(KycStatus::Pending.as_str())
        .fetch_optional(pool)
        .await
    }

    /// Submissions, newest first, optionally narrowed to one status.
    pub async fn list(pool: &DbPool, status: Option<KycStatus>) -> Result<Vec<KycSubmission>, sqlx::Error> {
        match status {
            Some(status) => {
                query_as::<_, KycSubmission>(
                    "SELECT * FROM kyc_submissions WHERE status = ? ORDER BY created_at DESC, id DESC",
                )
                .bind(status.as_str())
                .fetch_all(pool)
                .await
            }
            None => {
                query_as::<_, KycSubmission>(
                    "SELECT * FROM kyc_submissions ORDER BY created_at DESC, id DESC",
                )
                .fetch_all(pool)
                .await
            }
        }
    }

    /// Submissions with `since < created_at <= until`, oldest first.
    pub async fn created_between(
        pool: &DbPool,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<KycSubmission>, sqlx::Error> {
        query_as::<_, KycSubmission>(
            "SELECT * FROM kyc_submissions WHERE created_at > ? AND created_at <= ? ORDER BY created_at ASC, id ASC",
        )
        .bind(since)
        .bind(until)
        .fetch_all(pool)
        .await
    }

    pub async fn count_by_status(pool: &DbPool, status: KycStatus) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = query_as("SELECT COUNT(*) FROM kyc_submissions WHERE status = ?")
            .bind(status.as_str())
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}
