//! # Wallet Service
//!
//! Customer payout destinations and the platform's deposit addresses.
//!
//! ## Features
//!
//! - **Wallets**: crypto addresses a BUY order pays out to, upserted on
//!   `(account, asset, network, name)`; one default per asset
//! - **Payment methods**: mobile money or bank accounts a SELL order pays out
//!   to; one default per account
//! - **Admin wallets**: deposit addresses customers pay into; at most one
//!   active address per currency
//!
//! Addresses are stored as entered. There is no on-chain validation.

use lib_core::dto::{
    AdminWalletView, PaymentMethodView, SaveAdminWalletRequest, SavePaymentMethodRequest, SaveWalletRequest,
    WalletView,
};
use lib_core::model::store::models::{AdminWalletForUpsert, PaymentMethodForSave, WalletForUpsert};
use lib_core::model::store::{
    is_unique_violation, AdminWalletRepository, PaymentMethodRepository, WalletRepository,
};
use lib_core::{AppError, Ctx, DbPool, Result};
use tracing::{info, instrument};

#[derive(Clone)]
pub struct WalletService {
    db: DbPool,
}

fn code(value: &str) -> String {
    value.trim().to_uppercase()
}

fn payment_method_data(req: SavePaymentMethodRequest) -> PaymentMethodForSave {
    PaymentMethodForSave {
        method_type: req.method_type,
        provider: req.provider.trim().to_string(),
        account_name: req.account_name.trim().to_string(),
        account_number: req.account_number.trim().to_string(),
        label: req
            .label
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty()),
        is_default: req.is_default,
    }
}

impl WalletService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    // region: --- Wallets

    #[instrument(skip(self, req), fields(account_id = ctx.account_id()))]
    pub async fn upsert_wallet(&self, ctx: &Ctx, req: SaveWalletRequest) -> Result<WalletView> {
        req.validate()?;

        let wallet = WalletRepository::upsert(
            &self.db,
            WalletForUpsert {
                account_id: ctx.account_id(),
                asset: code(&req.asset),
                network: code(&req.network),
                name: req.name.trim().to_string(),
                address: req.address.trim().to_string(),
                is_default: req.is_default,
            },
        )
        .await?;

        info!(wallet = wallet.id, "[WALLET] Saved {} wallet", wallet.asset);
        Ok(WalletView::from(&wallet))
    }

    pub async fn list_wallets(&self, ctx: &Ctx) -> Result<Vec<WalletView>> {
        let wallets = WalletRepository::list_for_account(&self.db, ctx.account_id()).await?;
        Ok(wallets.iter().map(WalletView::from).collect())
    }

    pub async fn delete_wallet(&self, ctx: &Ctx, id: i64) -> Result<()> {
        if !WalletRepository::delete_owned(&self.db, id, ctx.account_id()).await? {
            return Err(AppError::NotFound("Wallet not found".to_string()));
        }
        Ok(())
    }

    // endregion: --- Wallets

    // region: --- Payment methods

    pub async fn create_payment_method(&self, ctx: &Ctx, req: SavePaymentMethodRequest) -> Result<PaymentMethodView> {
        req.validate()?;
        let method = PaymentMethodRepository::create(&self.db, ctx.account_id(), payment_method_data(req)).await?;
        Ok(PaymentMethodView::from(&method))
    }

    pub async fn update_payment_method(
        &self,
        ctx: &Ctx,
        id: i64,
        req: SavePaymentMethodRequest,
    ) -> Result<PaymentMethodView> {
        req.validate()?;
        let method = PaymentMethodRepository::update_owned(&self.db, id, ctx.account_id(), payment_method_data(req))
            .await?
            .ok_or_else(|| AppError::NotFound("Payment method not found".to_string()))?;
        Ok(PaymentMethodView::from(&method))
    }

    pub async fn list_payment_methods(&self, ctx: &Ctx) -> Result<Vec<PaymentMethodView>> {
        let methods = PaymentMethodRepository::list_for_account(&self.db, ctx.account_id()).await?;
        Ok(methods.iter().map(PaymentMethodView::from).collect())
    }

    pub async fn delete_payment_method(&self, ctx: &Ctx, id: i64) -> Result<()> {
        if !PaymentMethodRepository::delete_owned(&self.db, id, ctx.account_id()).await? {
            return Err(AppError::NotFound("Payment method not found".to_string()));
        }
        Ok(())
    }

    // endregion: --- Payment methods

    // region: --- Admin wallets

    pub async fn list_admin_wallets(&self, ctx: &Ctx) -> Result<Vec<AdminWalletView>> {
        ctx.require_admin()?;
        let wallets = AdminWalletRepository::list(&self.db).await?;
        Ok(wallets.iter().map(AdminWalletView::from).collect())
    }

    /// Register or update a deposit address. Activating it deactivates any
    /// other active address of the same currency.
    #[instrument(skip(self, req), fields(admin_id = ctx.account_id()))]
    pub async fn upsert_admin_wallet(&self, ctx: &Ctx, req: SaveAdminWalletRequest) -> Result<AdminWalletView> {
        ctx.require_admin()?;
        req.validate()?;

        let wallet = AdminWalletRepository::upsert(
            &self.db,
            AdminWalletForUpsert {
                chain: code(&req.chain),
                currency: code(&req.currency),
                address: req.address.trim().to_string(),
                is_active: req.is_active,
            },
        )
        .await
        .map_err(active_conflict)?;

        info!(wallet = wallet.id, active = wallet.is_active, "[ADMIN WALLET] Saved {} address", wallet.currency);
        Ok(AdminWalletView::from(&wallet))
    }

    #[instrument(skip(self), fields(admin_id = ctx.account_id()))]
    pub async fn set_admin_wallet_active(&self, ctx: &Ctx, id: i64, active: bool) -> Result<AdminWalletView> {
        ctx.require_admin()?;

        let wallet = AdminWalletRepository::set_active(&self.db, id, active)
            .await
            .map_err(active_conflict)?
            .ok_or_else(|| AppError::NotFound("Admin wallet not found".to_string()))?;
        Ok(AdminWalletView::from(&wallet))
    }

    // endregion: --- Admin wallets
}

/// Two concurrent activations for one currency trip the partial unique index.
fn active_conflict(err: sqlx::Error) -> AppError {
    if is_unique_violation(&err) {
        AppError::Conflict("Another address for this currency was activated concurrently".to_string())
    } else {
        err.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_verified_account, setup_test_db};
    use lib_core::model::store::models::{PaymentMethodType, Role};

    async fn fixture() -> (WalletService, Ctx, Ctx, Ctx) {
        let db = setup_test_db().await;
        let alice = create_verified_account(&db, "alice@example.com", "Secret!", Role::User).await;
        let bob = create_verified_account(&db, "bob@example.com", "Secret!", Role::User).await;
        let admin = create_verified_account(&db, "admin@example.com", "Secret!", Role::Admin).await;
        (
            WalletService::new(db),
            Ctx::new(alice.id, Role::User),
            Ctx::new(bob.id, Role::User),
            Ctx::new(admin.id, Role::Admin),
        )
    }

    fn wallet(name: &str, address: &str, is_default: bool) -> SaveWalletRequest {
        SaveWalletRequest {
            asset: "usdt".to_string(),
            network: "trc20".to_string(),
            name: name.to_string(),
            address: address.to_string(),
            is_default,
        }
    }

    fn momo(is_default: bool) -> SavePaymentMethodRequest {
        SavePaymentMethodRequest {
            method_type: PaymentMethodType::MobileMoney,
            provider: "MTN".to_string(),
            account_name: "Alice".to_string(),
            account_number: "0240000000".to_string(),
            label: Some("  ".to_string()),
            is_default,
        }
    }

    fn admin_wallet(address: &str) -> SaveAdminWalletRequest {
        SaveAdminWalletRequest {
            chain: "momo".to_string(),
            currency: "ghs".to_string(),
            address: address.to_string(),
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_upsert_updates_same_name_and_keeps_one_default() {
        let (service, alice, _, _) = fixture().await;

        let main = service.upsert_wallet(&alice, wallet("Main", "T1", true)).await.unwrap();
        let updated = service.upsert_wallet(&alice, wallet("Main", "T2", true)).await.unwrap();
        assert_eq!(main.id, updated.id);
        assert_eq!(updated.address, "T2");

        service.upsert_wallet(&alice, wallet("Cold", "T3", true)).await.unwrap();
        let wallets = service.list_wallets(&alice).await.unwrap();
        assert_eq!(wallets.len(), 2);
        assert_eq!(wallets.iter().filter(|w| w.is_default).count(), 1);
        assert!(wallets.iter().any(|w| w.name == "Cold" && w.is_default));
    }

    #[tokio::test]
    async fn test_foreign_delete_is_not_found() {
        let (service, alice, bob, _) = fixture().await;
        let main = service.upsert_wallet(&alice, wallet("Main", "T1", false)).await.unwrap();

        assert!(matches!(
            service.delete_wallet(&bob, main.id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        service.delete_wallet(&alice, main.id).await.unwrap();
        assert!(service.list_wallets(&alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_payment_methods() {
        let (service, alice, bob, _) = fixture().await;

        let first = service.create_payment_method(&alice, momo(true)).await.unwrap();
        assert_eq!(first.label, None);
        let second = service.create_payment_method(&alice, momo(true)).await.unwrap();

        let methods = service.list_payment_methods(&alice).await.unwrap();
        assert_eq!(methods.iter().filter(|m| m.is_default).count(), 1);
        assert!(methods.iter().any(|m| m.id == second.id && m.is_default));

        assert!(matches!(
            service.update_payment_method(&bob, first.id, momo(false)).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            service.delete_payment_method(&bob, first.id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        service.delete_payment_method(&alice, first.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_one_active_admin_wallet_per_currency() {
        let (service, alice, _, admin) = fixture().await;

        assert!(matches!(
            service.upsert_admin_wallet(&alice, admin_wallet("0551")).await.unwrap_err(),
            AppError::Unauthorized
        ));

        let first = service.upsert_admin_wallet(&admin, admin_wallet("0551")).await.unwrap();
        let second = service.upsert_admin_wallet(&admin, admin_wallet("0552")).await.unwrap();
        assert_eq!(second.currency, "GHS");

        let wallets = service.list_admin_wallets(&admin).await.unwrap();
        let active: Vec<_> = wallets.iter().filter(|w| w.is_active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, second.id);

        service.set_admin_wallet_active(&admin, first.id, true).await.unwrap();
        let wallets = service.list_admin_wallets(&admin).await.unwrap();
        let active: Vec<_> = wallets.iter().filter(|w| w.is_active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, first.id);

        assert!(matches!(
            service.set_admin_wallet_active(&admin, 999, true).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }
}
