//! # Wallet & Payment Method Handlers
//!
//! Owner-scoped payout destinations.
//!
//! - `GET/POST /api/wallets`, `DELETE /api/wallets/{id}`
//! - `GET/POST /api/payment-methods`, `PUT/DELETE /api/payment-methods/{id}`
//!
//! Deleting or updating a row owned by someone else answers 404.

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use lib_core::dto::{MessageResponse, PaymentMethodView, SavePaymentMethodRequest, SaveWalletRequest, WalletView};
use lib_core::{Ctx, Result};
use tracing::instrument;

use crate::services::WalletService;

// region: --- Wallets

pub async fn list_wallets(State(service): State<WalletService>, ctx: Ctx) -> Result<Json<Vec<WalletView>>> {
    Ok(Json(service.list_wallets(&ctx).await?))
}

/// Insert or update on `(asset, network, name)`.
#[instrument(skip(service, req), fields(account_id = ctx.account_id(), asset = %req.asset))]
pub async fn save_wallet(
    State(service): State<WalletService>,
    ctx: Ctx,
    Json(req): Json<SaveWalletRequest>,
) -> Result<Json<WalletView>> {
    Ok(Json(service.upsert_wallet(&ctx, req).await?))
}

#[instrument(skip(service), fields(account_id = ctx.account_id()))]
pub async fn delete_wallet(
    State(service): State<WalletService>,
    ctx: Ctx,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    service.delete_wallet(&ctx, id).await?;
    Ok(Json(MessageResponse::new("Wallet deleted")))
}

// endregion: --- Wallets

// region: --- Payment methods

pub async fn list_payment_methods(
    State(service): State<WalletService>,
    ctx: Ctx,
) -> Result<Json<Vec<PaymentMethodView>>> {
    Ok(Json(service.list_payment_methods(&ctx).await?))
}

#[instrument(skip(service, req), fields(account_id = ctx.account_id(), method_type = %req.method_type))]
pub async fn create_payment_method(
    State(service): State<WalletService>,
    ctx: Ctx,
    Json(req): Json<SavePaymentMethodRequest>,
) -> Result<(StatusCode, Json<PaymentMethodView>)> {
    let method = service.create_payment_method(&ctx, req).await?;
    Ok((StatusCode::CREATED, Json(method)))
}

#[instrument(skip(service, req), fields(account_id = ctx.account_id()))]
pub async fn update_payment_method(
    State(service): State<WalletService>,
    ctx: Ctx,
    Path(id): Path<i64>,
    Json(req): Json<SavePaymentMethodRequest>,
) -> Result<Json<PaymentMethodView>> {
    Ok(Json(service.update_payment_method(&ctx, id, req).await?))
}

#[instrument(skip(service), fields(account_id = ctx.account_id()))]
pub async fn delete_payment_method(
    State(service): State<WalletService>,
    ctx: Ctx,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    service.delete_payment_method(&ctx, id).await?;
    Ok(Json(MessageResponse::new("Payment method deleted")))
}

// endregion: --- Payment methods
