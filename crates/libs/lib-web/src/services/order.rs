//! # Order Service
//!
//! Order placement, owner-scoped reads with deposit address resolution and
//! admin-driven status transitions.
//!
//! ## Human-readable ids
//!
//! Orders are exposed as `CD-YYMMDD-XXXXXX`: the UTC placement date and six
//! symbols from an alphabet without `O`, `0`, `I` or `L`. Uniqueness is
//! enforced by the database; a collision is retried with a fresh suffix up to
//! `ORDER_ID_MAX_ATTEMPTS` times.
//!
//! ## Status machine
//!
//! ```text
//! PENDING ──> PAID ──> COMPLETED
//!    │          └────> REJECTED
//!    ├──────────────> COMPLETED
//!    └──────────────> REJECTED
//! ```

use chrono::{DateTime, Utc};
use lib_core::dto::{DepositAddress, OrderDetailsResponse, OrderView, PlaceOrderRequest};
use lib_core::model::store::models::{OrderDirection, OrderForCreate, OrderStatus};
use lib_core::model::store::{
    is_unique_violation, AdminWalletRepository, OrderRepository, PaymentMethodRepository, WalletRepository,
};
use lib_core::{AppError, Config, Ctx, DbPool, Result};
use rand::Rng;
use tracing::{info, instrument, warn};

pub const ORDER_ID_PREFIX: &str = "CD";
pub const ORDER_ID_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ123456789";
pub const ORDER_ID_SUFFIX_LEN: usize = 6;

/// Build a human order id for an order placed at `now`.
pub fn generate_human_id<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> String {
    let suffix: String = (0..ORDER_ID_SUFFIX_LEN)
        .map(|_| ORDER_ID_ALPHABET[rng.gen_range(0..ORDER_ID_ALPHABET.len())] as char)
        .collect();
    format!("{}-{}-{}", ORDER_ID_PREFIX, now.format("%y%m%d"), suffix)
}

#[derive(Clone)]
pub struct OrderService {
    db: DbPool,
    max_id_attempts: u32,
}

impl OrderService {
    pub fn new(db: DbPool, config: &Config) -> Self {
        Self {
            db,
            max_id_attempts: config.order_id_max_attempts.max(1),
        }
    }

    #[instrument(skip(self, req), fields(account_id = ctx.account_id()))]
    pub async fn place_order(&self, ctx: &Ctx, req: PlaceOrderRequest) -> Result<OrderView> {
        req.validate()?;
        let asset = req.asset.trim().to_uppercase();

        let (wallet_id, payment_method_id) = match req.direction {
            OrderDirection::Buy => {
                let wallet_id = req
                    .wallet_id
                    .ok_or_else(|| AppError::invalid("wallet_id", "A payout wallet is required to buy"))?;
                let wallet = WalletRepository::find_owned(&self.db, wallet_id, ctx.account_id())
                    .await?
                    .ok_or_else(|| AppError::NotFound("Wallet not found".to_string()))?;
                if wallet.asset != asset {
                    return Err(AppError::invalid(
                        "wallet_id",
                        format!("Wallet holds {}, not {}", wallet.asset, asset),
                    ));
                }
                (Some(wallet.id), None)
            }
            OrderDirection::Sell => {
                let method_id = req.payment_method_id.ok_or_else(|| {
                    AppError::invalid("payment_method_id", "A payout method is required to sell")
                })?;
                let method = PaymentMethodRepository::find_owned(&self.db, method_id, ctx.account_id())
                    .await?
                    .ok_or_else(|| AppError::NotFound("Payment method not found".to_string()))?;
                (None, Some(method.id))
            }
        };

        let mut data = OrderForCreate {
            human_id: String::new(),
            account_id: ctx.account_id(),
            direction: req.direction,
            asset,
            network: req.network.trim().to_uppercase(),
            fiat_currency: req.fiat_currency.trim().to_uppercase(),
            crypto_amount: req.crypto_amount,
            fiat_amount: req.fiat_amount,
            rate: req.rate,
            wallet_id,
            payment_method_id,
        };

        for attempt in 1..=self.max_id_attempts {
            data.human_id = generate_human_id(Utc::now(), &mut rand::thread_rng());

            match OrderRepository::create(&self.db, &data).await {
                Ok(order) => {
                    info!(order = %order.human_id, "[ORDER] Placed {} order", order.direction);
                    return Ok(OrderView::from(&order));
                }
                Err(e) if is_unique_violation(&e) => {
                    warn!(attempt, human_id = %data.human_id, "[ORDER] Order id collision, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::Conflict("Could not allocate an order id, please retry".to_string()))
    }

    /// Caller's order plus, while it is still PENDING, where to pay.
    #[instrument(skip(self), fields(account_id = ctx.account_id()))]
    pub async fn get_order_details(&self, ctx: &Ctx, human_id: &str) -> Result<OrderDetailsResponse> {
        let order = OrderRepository::find_by_human_id(&self.db, human_id.trim())
            .await?
            .filter(|o| o.account_id == ctx.account_id())
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

        let deposit_address = if order.status == OrderStatus::Pending {
            AdminWalletRepository::find_active_by_currency(&self.db, order.deposit_currency())
                .await?
                .as_ref()
                .map(DepositAddress::from)
        } else {
            None
        };

        Ok(OrderDetailsResponse {
            order: OrderView::from(&order),
            deposit_address,
        })
    }

    pub async fn list_orders(&self, ctx: &Ctx) -> Result<Vec<OrderView>> {
        let orders = OrderRepository::list_for_account(&self.db, ctx.account_id()).await?;
        Ok(orders.iter().map(OrderView::from).collect())
    }

    // region: --- Admin

    pub async fn admin_list_orders(&self, ctx: &Ctx, status: Option<OrderStatus>) -> Result<Vec<OrderView>> {
        ctx.require_admin()?;
        let orders = OrderRepository::list_all(&self.db, status).await?;
        Ok(orders.iter().map(OrderView::from).collect())
    }

    #[instrument(skip(self), fields(admin_id = ctx.account_id()))]
    pub async fn admin_update_status(&self, ctx: &Ctx, human_id: &str, next: OrderStatus) -> Result<OrderView> {
        ctx.require_admin()?;

        let order = OrderRepository::find_by_human_id(&self.db, human_id.trim())
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

        if !order.status.can_transition_to(next) {
            return Err(AppError::Conflict(format!(
                "Cannot move order from {} to {}",
                order.status, next
            )));
        }

        let updated = OrderRepository::update_status(&self.db, order.id, order.status, next)
            .await?
            .ok_or_else(|| AppError::Conflict("Order was updated concurrently".to_string()))?;

        info!(order = %updated.human_id, "[ORDER] {} -> {}", order.status, updated.status);
        Ok(OrderView::from(&updated))
    }

    // endregion: --- Admin
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_verified_account, setup_test_db, test_config};
    use chrono::TimeZone;
    use lib_core::model::store::models::{AdminWalletForUpsert, PaymentMethodForSave, PaymentMethodType, Role, WalletForUpsert};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Fixture {
        db: DbPool,
        service: OrderService,
        alice: Ctx,
        bob: Ctx,
        admin: Ctx,
        alice_wallet: i64,
        alice_momo: i64,
    }

    async fn fixture() -> Fixture {
        let db = setup_test_db().await;
        let alice = create_verified_account(&db, "alice@example.com", "Secret!", Role::User).await;
        let bob = create_verified_account(&db, "bob@example.com", "Secret!", Role::User).await;
        let admin = create_verified_account(&db, "admin@example.com", "Secret!", Role::Admin).await;

        let wallet = WalletRepository::upsert(
            &db,
            WalletForUpsert {
                account_id: alice.id,
                asset: "USDT".to_string(),
                network: "TRC20".to_string(),
                name: "Main".to_string(),
                address: "TXYZ".to_string(),
                is_default: true,
            },
        )
        .await
        .unwrap();
        let momo = PaymentMethodRepository::create(
            &db,
            alice.id,
            PaymentMethodForSave {
                method_type: PaymentMethodType::MobileMoney,
                provider: "MTN".to_string(),
                account_name: "Alice".to_string(),
                account_number: "0240000000".to_string(),
                label: None,
                is_default: true,
            },
        )
        .await
        .unwrap();

        Fixture {
            service: OrderService::new(db.clone(), &test_config()),
            db,
            alice: Ctx::new(alice.id, Role::User),
            bob: Ctx::new(bob.id, Role::User),
            admin: Ctx::new(admin.id, Role::Admin),
            alice_wallet: wallet.id,
            alice_momo: momo.id,
        }
    }

    fn buy(wallet_id: i64) -> PlaceOrderRequest {
        PlaceOrderRequest {
            direction: OrderDirection::Buy,
            asset: "usdt".to_string(),
            network: "trc20".to_string(),
            fiat_currency: "ghs".to_string(),
            crypto_amount: 10.0,
            fiat_amount: 155.0,
            rate: 15.5,
            wallet_id: Some(wallet_id),
            payment_method_id: None,
        }
    }

    async fn activate_ghs_wallet(db: &DbPool) {
        AdminWalletRepository::upsert(
            db,
            AdminWalletForUpsert {
                chain: "MOMO".to_string(),
                currency: "GHS".to_string(),
                address: "0559999999".to_string(),
                is_active: true,
            },
        )
        .await
        .unwrap();
    }

    #[test]
    fn test_human_id_shape() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..500 {
            let id = generate_human_id(now, &mut rng);
            let (head, suffix) = id.split_at("CD-240309-".len());
            assert_eq!(head, "CD-240309-");
            assert_eq!(suffix.len(), ORDER_ID_SUFFIX_LEN);
            assert!(suffix.bytes().all(|b| ORDER_ID_ALPHABET.contains(&b)));
            assert!(!suffix.contains(['O', '0', 'I', 'L']));
        }
    }

    #[tokio::test]
    async fn test_place_buy_order() {
        let f = fixture().await;

        let order = f.service.place_order(&f.alice, buy(f.alice_wallet)).await.unwrap();

        assert!(order.id.starts_with("CD-"));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.asset, "USDT");
        assert_eq!(order.fiat_currency, "GHS");
        assert_eq!(order.payment_method_id, None);
    }

    #[tokio::test]
    async fn test_place_order_requires_owned_payout() {
        let f = fixture().await;

        let err = f.service.place_order(&f.bob, buy(f.alice_wallet)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let sell = PlaceOrderRequest {
            direction: OrderDirection::Sell,
            wallet_id: None,
            payment_method_id: Some(f.alice_momo),
            ..buy(f.alice_wallet)
        };
        assert!(matches!(
            f.service.place_order(&f.bob, sell.clone()).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        let order = f.service.place_order(&f.alice, sell).await.unwrap();
        assert_eq!(order.wallet_id, None);
    }

    #[tokio::test]
    async fn test_wallet_asset_must_match() {
        let f = fixture().await;
        let req = PlaceOrderRequest {
            asset: "BTC".to_string(),
            ..buy(f.alice_wallet)
        };

        let err = f.service.place_order(&f.alice, req).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_foreign_order_is_not_found() {
        let f = fixture().await;
        let order = f.service.place_order(&f.alice, buy(f.alice_wallet)).await.unwrap();

        let err = f.service.get_order_details(&f.bob, &order.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_deposit_address_only_while_pending() {
        let f = fixture().await;
        activate_ghs_wallet(&f.db).await;
        let order = f.service.place_order(&f.alice, buy(f.alice_wallet)).await.unwrap();

        let details = f.service.get_order_details(&f.alice, &order.id).await.unwrap();
        let address = details.deposit_address.unwrap();
        assert_eq!(address.currency, "GHS");
        assert_eq!(address.address, "0559999999");

        f.service
            .admin_update_status(&f.admin, &order.id, OrderStatus::Completed)
            .await
            .unwrap();
        let details = f.service.get_order_details(&f.alice, &order.id).await.unwrap();
        assert_eq!(details.order.status, OrderStatus::Completed);
        assert!(details.deposit_address.is_none());
    }

    #[tokio::test]
    async fn test_no_active_admin_wallet_means_no_address() {
        let f = fixture().await;
        let order = f.service.place_order(&f.alice, buy(f.alice_wallet)).await.unwrap();

        let details = f.service.get_order_details(&f.alice, &order.id).await.unwrap();
        assert!(details.deposit_address.is_none());
    }

    #[tokio::test]
    async fn test_status_moves_forward_only() {
        let f = fixture().await;
        let order = f.service.place_order(&f.alice, buy(f.alice_wallet)).await.unwrap();

        assert!(matches!(
            f.service
                .admin_update_status(&f.alice, &order.id, OrderStatus::Paid)
                .await
                .unwrap_err(),
            AppError::Unauthorized
        ));

        f.service
            .admin_update_status(&f.admin, &order.id, OrderStatus::Paid)
            .await
            .unwrap();
        let err = f
            .service
            .admin_update_status(&f.admin, &order.id, OrderStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        f.service
            .admin_update_status(&f.admin, &order.id, OrderStatus::Completed)
            .await
            .unwrap();
        let err = f
            .service
            .admin_update_status(&f.admin, &order.id, OrderStatus::Rejected)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_list_orders_is_owner_scoped() {
        let f = fixture().await;
        f.service.place_order(&f.alice, buy(f.alice_wallet)).await.unwrap();
        f.service.place_order(&f.alice, buy(f.alice_wallet)).await.unwrap();

        assert_eq!(f.service.list_orders(&f.alice).await.unwrap().len(), 2);
        assert!(f.service.list_orders(&f.bob).await.unwrap().is_empty());

        let pending = f
            .service
            .admin_list_orders(&f.admin, Some(OrderStatus::Pending))
            .await
            .unwrap();
        assert_eq!(pending.len(), 2);
    }
}
