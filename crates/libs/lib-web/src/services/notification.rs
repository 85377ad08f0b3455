//! # Notification Service
//!
//! Admin dashboards poll for orders and KYC submissions created since their
//! last watermark. The poller never fails: callers without admin rights get
//! an empty set, and a storage failure yields an empty set with the
//! watermark left where it was so the next poll covers the same window.

use chrono::{DateTime, Utc};
use lib_core::dto::{CheckNewResponse, NotificationEvent};
use lib_core::model::store::{KycRepository, OrderRepository};
use lib_core::{Ctx, DbPool};
use tracing::{debug, error, warn};

#[derive(Clone)]
pub struct NotificationService {
    db: DbPool,
}

impl NotificationService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Events with `since < created_at <= checked_at`, oldest first.
    ///
    /// Without a watermark the window starts at `checked_at`, so a first poll
    /// returns no events and only establishes the watermark.
    pub async fn check_new(&self, ctx: Option<&Ctx>, since: Option<DateTime<Utc>>) -> CheckNewResponse {
        let checked_at = Utc::now();
        let since = since.unwrap_or(checked_at);

        match ctx {
            Some(ctx) if ctx.is_admin() => {}
            Some(ctx) => {
                warn!(account_id = ctx.account_id(), "[NOTIFY] Non-admin poll ignored");
                return CheckNewResponse::empty(checked_at);
            }
            None => {
                warn!("[NOTIFY] Anonymous poll ignored");
                return CheckNewResponse::empty(checked_at);
            }
        }

        let orders = match OrderRepository::created_between(&self.db, since, checked_at).await {
            Ok(orders) => orders,
            Err(e) => {
                error!("[NOTIFY] Order poll failed: {}", e);
                return CheckNewResponse::empty(since);
            }
        };
        let submissions = match KycRepository::created_between(&self.db, since, checked_at).await {
            Ok(submissions) => submissions,
            Err(e) => {
                error!("[NOTIFY] KYC poll failed: {}", e);
                return CheckNewResponse::empty(since);
            }
        };

        let mut events: Vec<NotificationEvent> = orders
            .iter()
            .map(NotificationEvent::from)
            .chain(submissions.iter().map(NotificationEvent::from))
            .collect();
        events.sort_by_key(NotificationEvent::created_at);

        debug!(count = events.len(), "[NOTIFY] Poll served");
        CheckNewResponse { events, checked_at }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_verified_account, setup_test_db};
    use chrono::Duration;
    use lib_core::model::store::models::{
        IdType, KycForSubmit, OrderDirection, OrderForCreate, Role,
    };

    fn order(account_id: i64, human_id: &str) -> OrderForCreate {
        OrderForCreate {
            human_id: human_id.to_string(),
            account_id,
            direction: OrderDirection::Sell,
            asset: "USDT".to_string(),
            network: "TRC20".to_string(),
            fiat_currency: "GHS".to_string(),
            crypto_amount: 5.0,
            fiat_amount: 77.5,
            rate: 15.5,
            wallet_id: None,
            payment_method_id: None,
        }
    }

    #[tokio::test]
    async fn test_non_admin_gets_empty_current_watermark() {
        let db = setup_test_db().await;
        let user = create_verified_account(&db, "u@example.com", "Secret!", Role::User).await;
        OrderRepository::create(&db, &order(user.id, "CD-240101-AAAAAA")).await.unwrap();
        let service = NotificationService::new(db);
        let since = Utc::now() - Duration::hours(1);

        for ctx in [None, Some(Ctx::new(user.id, Role::User))] {
            let before = Utc::now();
            let res = service.check_new(ctx.as_ref(), Some(since)).await;
            assert!(res.events.is_empty());
            assert!(res.checked_at >= before);
        }
    }

    #[tokio::test]
    async fn test_merges_both_kinds_in_order_and_respects_watermark() {
        let db = setup_test_db().await;
        let user = create_verified_account(&db, "u@example.com", "Secret!", Role::User).await;
        let admin = create_verified_account(&db, "a@example.com", "Secret!", Role::Admin).await;
        let ctx = Ctx::new(admin.id, Role::Admin);
        let service = NotificationService::new(db.clone());

        let since = Utc::now() - Duration::seconds(1);
        OrderRepository::create(&db, &order(user.id, "CD-240101-AAAAAA")).await.unwrap();
        KycRepository::create(
            &db,
            KycForSubmit {
                account_id: user.id,
                id_type: IdType::VoterId,
                id_number: None,
                document_urls: vec!["memory://kyc/1/a.jpg".to_string()],
            },
        )
        .await
        .unwrap();
        OrderRepository::create(&db, &order(user.id, "CD-240101-BBBBBB")).await.unwrap();

        let first = service.check_new(Some(&ctx), Some(since)).await;
        let orders = first
            .events
            .iter()
            .filter(|e| matches!(e, NotificationEvent::Order { .. }))
            .count();
        assert_eq!(first.events.len(), 3);
        assert_eq!(orders, 2);
        assert!(first.events.windows(2).all(|w| w[0].created_at() <= w[1].created_at()));

        let second = service.check_new(Some(&ctx), Some(first.checked_at)).await;
        assert!(second.events.is_empty());
        assert!(second.checked_at >= first.checked_at);
    }

    #[tokio::test]
    async fn test_first_poll_without_watermark_is_empty() {
        let db = setup_test_db().await;
        let user = create_verified_account(&db, "u@example.com", "Secret!", Role::User).await;
        let admin = create_verified_account(&db, "a@example.com", "Secret!", Role::Admin).await;
        OrderRepository::create(&db, &order(user.id, "CD-240101-AAAAAA")).await.unwrap();
        let service = NotificationService::new(db);

        let before = Utc::now();
        let res = service.check_new(Some(&Ctx::new(admin.id, Role::Admin)), None).await;
        assert!(res.events.is_empty());
        assert!(res.checked_at >= before);
    }

    #[tokio::test]
    async fn test_storage_failure_keeps_watermark() {
        let db = setup_test_db().await;
        let admin = create_verified_account(&db, "a@example.com", "Secret!", Role::Admin).await;
        let service = NotificationService::new(db.clone());
        db.close().await;

        let since = Utc::now() - Duration::minutes(5);
        let res = service.check_new(Some(&Ctx::new(admin.id, Role::Admin)), Some(since)).await;
        assert!(res.events.is_empty());
        assert_eq!(res.checked_at, since);
    }
}
