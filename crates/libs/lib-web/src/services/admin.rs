//! # Admin Service
//!
//! Account administration and dashboard counts. Every operation requires an
//! ADMIN session.

use lib_core::dto::{AccountListQuery, AccountView, OverviewResponse, UpdateAccountRequest};
use lib_core::model::store::models::{AccountForUpdate, AccountStatus, KycStatus, OrderStatus, Role};
use lib_core::model::store::{AccountRepository, KycRepository, OrderRepository};
use lib_core::{AppError, Ctx, DbPool, Result};
use tracing::{info, instrument};

#[derive(Clone)]
pub struct AdminService {
    db: DbPool,
}

impl AdminService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub async fn list_accounts(&self, ctx: &Ctx, query: AccountListQuery) -> Result<Vec<AccountView>> {
        ctx.require_admin()?;
        let (limit, offset) = query.page();
        let accounts = AccountRepository::list(&self.db, limit, offset).await?;
        Ok(accounts.iter().map(AccountView::from).collect())
    }

    /// Change role and/or status. Admins cannot demote or ban themselves.
    #[instrument(skip(self, req), fields(admin_id = ctx.account_id()))]
    pub async fn update_account(&self, ctx: &Ctx, id: i64, req: UpdateAccountRequest) -> Result<AccountView> {
        ctx.require_admin()?;
        req.validate()?;

        let self_lockout = id == ctx.account_id()
            && (req.role == Some(Role::User) || req.status == Some(AccountStatus::Banned));
        if self_lockout {
            return Err(AppError::Conflict(
                "Administrators cannot demote or ban their own account".to_string(),
            ));
        }

        let mut changes = AccountForUpdate::new();
        if let Some(role) = req.role {
            changes = changes.role(role);
        }
        if let Some(status) = req.status {
            changes = changes.status(status);
        }

        let account = AccountRepository::update(&self.db, id, changes)
            .await?
            .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;

        info!(account = account.id, role = %account.role, status = %account.status, "[ADMIN] Account updated");
        Ok(AccountView::from(&account))
    }

    pub async fn overview(&self, ctx: &Ctx) -> Result<OverviewResponse> {
        ctx.require_admin()?;

        Ok(OverviewResponse {
            accounts: AccountRepository::count(&self.db).await?,
            pending_kyc: KycRepository::count_by_status(&self.db, KycStatus::Pending).await?,
            pending_orders: OrderRepository::count_by_status(&self.db, OrderStatus::Pending).await?,
            completed_orders: OrderRepository::count_by_status(&self.db, OrderStatus::Completed).await?,
        })
    }
}
