//! # Order Handlers
//!
//! Customer-facing order endpoints. Admin order endpoints live in
//! [`super::admin`].

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use lib_core::dto::{OrderDetailsResponse, OrderView, PlaceOrderRequest};
use lib_core::{Ctx, Result};
use tracing::{info, instrument};

use crate::services::OrderService;

/// Place a BUY or SELL order.
///
/// **Route**: `POST /api/orders`
///
/// # Returns
///
/// Success (201): the PENDING order, `id` being its `CD-YYMMDD-XXXXXX` id
///
/// Error (400): invalid codes, amounts or missing payout destination
/// Error (404): payout wallet / payment method not owned by the caller
#[instrument(skip(service, req), fields(account_id = ctx.account_id(), direction = %req.direction))]
pub async fn place_order(
    State(service): State<OrderService>,
    ctx: Ctx,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<OrderView>)> {
    let order = service.place_order(&ctx, req).await?;
    info!("[ORDERS] Created {}", order.id);
    Ok((StatusCode::CREATED, Json(order)))
}

/// **Route**: `GET /api/orders`
pub async fn list_orders(State(service): State<OrderService>, ctx: Ctx) -> Result<Json<Vec<OrderView>>> {
    Ok(Json(service.list_orders(&ctx).await?))
}

/// Order details with the deposit address while the order is PENDING.
///
/// **Route**: `GET /api/orders/{id}`
///
/// Error (404): unknown id, or the order belongs to another account
#[instrument(skip(service), fields(account_id = ctx.account_id()))]
pub async fn get_order(
    State(service): State<OrderService>,
    ctx: Ctx,
    Path(id): Path<String>,
) -> Result<Json<OrderDetailsResponse>> {
    Ok(Json(service.get_order_details(&ctx, &id).await?))
}
