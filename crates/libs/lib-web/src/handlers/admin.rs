//! # Admin Handlers
//!
//! Back-office endpoints. Each requires a session whose account has the ADMIN
//! role, except the notification poller which answers non-admins with an
//! empty event list instead of an error.
//!
//! - `GET /api/admin/overview` - dashboard counters
//! - `GET /api/admin/accounts`, `PATCH /api/admin/accounts/{id}` - role/ban
//! - `GET /api/admin/orders`, `POST /api/admin/orders/{id}/status`
//! - `GET /api/admin/kyc`, `POST /api/admin/kyc/{id}/review`
//! - `GET/POST /api/admin/wallets`, `POST /api/admin/wallets/{id}/active`
//! - `GET /api/admin/notifications?since=<rfc3339>`

use axum::extract::{rejection::QueryRejection, Json, Path, Query, State};
use lib_core::dto::{
    AccountListQuery, AccountView, AdminWalletView, CheckNewQuery, CheckNewResponse, KycAdminView, KycListQuery,
    KycReviewRequest, OrderListQuery, OrderView, OverviewResponse, SaveAdminWalletRequest, SetActiveRequest,
    UpdateAccountRequest, UpdateOrderStatusRequest,
};
use lib_core::{Ctx, Result};
use tracing::{debug, instrument, warn};

use crate::services::{AdminService, KycService, NotificationService, OrderService, WalletService};

pub async fn overview(State(service): State<AdminService>, ctx: Ctx) -> Result<Json<OverviewResponse>> {
    Ok(Json(service.overview(&ctx).await?))
}

// region: --- Accounts

pub async fn list_accounts(
    State(service): State<AdminService>,
    ctx: Ctx,
    Query(query): Query<AccountListQuery>,
) -> Result<Json<Vec<AccountView>>> {
    Ok(Json(service.list_accounts(&ctx, query).await?))
}

#[instrument(skip(service, req), fields(admin_id = ctx.account_id()))]
pub async fn update_account(
    State(service): State<AdminService>,
    ctx: Ctx,
    Path(id): Path<i64>,
    Json(req): Json<UpdateAccountRequest>,
) -> Result<Json<AccountView>> {
    Ok(Json(service.update_account(&ctx, id, req).await?))
}

// endregion: --- Accounts

// region: --- Orders

pub async fn list_orders(
    State(service): State<OrderService>,
    ctx: Ctx,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<Vec<OrderView>>> {
    Ok(Json(service.admin_list_orders(&ctx, query.status).await?))
}

/// **Route**: `POST /api/admin/orders/{id}/status`
///
/// Error (409): the transition would move the order backwards or out of a
/// terminal state
#[instrument(skip(service, req), fields(admin_id = ctx.account_id(), status = %req.status))]
pub async fn update_order_status(
    State(service): State<OrderService>,
    ctx: Ctx,
    Path(id): Path<String>,
    Json(req): Json<UpdateOrderStatusRequest>,
) -> Result<Json<OrderView>> {
    Ok(Json(service.admin_update_status(&ctx, &id, req.status).await?))
}

// endregion: --- Orders

// region: --- KYC

pub async fn list_kyc(
    State(service): State<KycService>,
    ctx: Ctx,
    Query(query): Query<KycListQuery>,
) -> Result<Json<Vec<KycAdminView>>> {
    Ok(Json(service.admin_list(&ctx, query.status).await?))
}

#[instrument(skip(service, req), fields(admin_id = ctx.account_id()))]
pub async fn review_kyc(
    State(service): State<KycService>,
    ctx: Ctx,
    Path(id): Path<i64>,
    Json(req): Json<KycReviewRequest>,
) -> Result<Json<KycAdminView>> {
    Ok(Json(service.admin_review(&ctx, id, req).await?))
}

// endregion: --- KYC

// region: --- Admin wallets

pub async fn list_admin_wallets(State(service): State<WalletService>, ctx: Ctx) -> Result<Json<Vec<AdminWalletView>>> {
    Ok(Json(service.list_admin_wallets(&ctx).await?))
}

pub async fn save_admin_wallet(
    State(service): State<WalletService>,
    ctx: Ctx,
    Json(req): Json<SaveAdminWalletRequest>,
) -> Result<Json<AdminWalletView>> {
    Ok(Json(service.upsert_admin_wallet(&ctx, req).await?))
}

pub async fn set_admin_wallet_active(
    State(service): State<WalletService>,
    ctx: Ctx,
    Path(id): Path<i64>,
    Json(req): Json<SetActiveRequest>,
) -> Result<Json<AdminWalletView>> {
    Ok(Json(service.set_admin_wallet_active(&ctx, id, req.is_active).await?))
}

// endregion: --- Admin wallets

/// Poll for orders and KYC submissions created after `since`.
///
/// **Route**: `GET /api/admin/notifications?since=2024-01-01T00:00:00Z`
///
/// Always 200. Feed `checked_at` back as the next `since`. A missing or
/// malformed `since` counts as a first poll.
pub async fn check_new(
    State(service): State<NotificationService>,
    ctx: Option<Ctx>,
    query: std::result::Result<Query<CheckNewQuery>, QueryRejection>,
) -> Json<CheckNewResponse> {
    let since = match query {
        Ok(Query(query)) => query.since,
        Err(rejection) => {
            warn!("[NOTIFY] Ignoring bad poll query: {}", rejection.body_text());
            None
        }
    };
    let response = service.check_new(ctx.as_ref(), since).await;
    debug!("[NOTIFY] {} new events", response.events.len());
    Json(response)
}

#[cfg(test)]
mod tests {
    use crate::handlers::auth::tests::{bearer, create_verified_account, send, setup_test_db, test_app, test_config};
    use axum::http::StatusCode;
    use lib_core::model::store::models::Role;

    #[tokio::test]
    async fn test_admin_routes_reject_users() {
        let pool = setup_test_db().await;
        let config = test_config();
        let user = create_verified_account(&pool, "u@example.com", "Secret!", Role::User).await;
        let admin = create_verified_account(&pool, "a@example.com", "Secret!", Role::Admin).await;

        let (status, _) = send(
            test_app(pool.clone(), config.clone()),
            "GET",
            "/api/admin/overview",
            Some(&bearer(&config, &user)),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(
            test_app(pool, config.clone()),
            "GET",
            "/api/admin/overview",
            Some(&bearer(&config, &admin)),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["accounts"], 2);
    }

    #[tokio::test]
    async fn test_notifications_never_error_for_non_admins() {
        let pool = setup_test_db().await;
        let config = test_config();
        let user = create_verified_account(&pool, "u@example.com", "Secret!", Role::User).await;
        let uri = "/api/admin/notifications?since=2024-01-01T00:00:00Z";

        for auth in [None, Some(bearer(&config, &user))] {
            let (status, body) = send(test_app(pool.clone(), config.clone()), "GET", uri, auth.as_deref(), None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["events"].as_array().unwrap().len(), 0);
            assert!(body["checked_at"].is_string());
        }
    }

    #[tokio::test]
    async fn test_notifications_tolerate_missing_or_bad_watermark() {
        let pool = setup_test_db().await;
        let config = test_config();
        let user = create_verified_account(&pool, "u@example.com", "Secret!", Role::User).await;
        let admin = create_verified_account(&pool, "a@example.com", "Secret!", Role::Admin).await;
        let sessions = [None, Some(bearer(&config, &user)), Some(bearer(&config, &admin))];

        for uri in ["/api/admin/notifications", "/api/admin/notifications?since=garbage"] {
            for auth in &sessions {
                let (status, body) =
                    send(test_app(pool.clone(), config.clone()), "GET", uri, auth.as_deref(), None).await;
                assert_eq!(status, StatusCode::OK, "{uri}");
                assert_eq!(body["events"].as_array().unwrap().len(), 0);
                assert!(body["checked_at"].is_string());
            }
        }
    }

    #[tokio::test]
    async fn test_promoted_role_applies_on_next_request() {
        let pool = setup_test_db().await;
        let config = test_config();
        let user = create_verified_account(&pool, "u@example.com", "Secret!", Role::User).await;
        let admin = create_verified_account(&pool, "a@example.com", "Secret!", Role::Admin).await;
        let user_session = bearer(&config, &user);

        let (status, _) = send(
            test_app(pool.clone(), config.clone()),
            "PATCH",
            &format!("/api/admin/accounts/{}", user.id),
            Some(&bearer(&config, &admin)),
            Some(serde_json::json!({ "role": "ADMIN" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        // Session token still says USER; the role is read from the account row.
        let (status, _) = send(test_app(pool, config), "GET", "/api/admin/overview", Some(&user_session), None).await;
        assert_eq!(status, StatusCode::OK);
    }
}
