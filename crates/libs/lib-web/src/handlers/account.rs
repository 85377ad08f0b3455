//! # Account Handlers
//!
//! Profile of the signed-in account.
//!
//! - `GET /api/account/profile` - public account view
//! - `PUT /api/account/profile` - change first/last name
//! - `POST /api/account/profile/image` - upload a profile picture (base64)

use axum::extract::{Json, State};
use lib_core::dto::{AccountView, ProfileImageRequest, UpdateProfileRequest};
use lib_core::{Ctx, Result};
use tracing::instrument;

use crate::services::AccountService;

pub async fn get_profile(State(service): State<AccountService>, ctx: Ctx) -> Result<Json<AccountView>> {
    Ok(Json(service.profile(&ctx).await?))
}

#[instrument(skip(service, req), fields(account_id = ctx.account_id()))]
pub async fn update_profile(
    State(service): State<AccountService>,
    ctx: Ctx,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<AccountView>> {
    Ok(Json(service.update_profile(&ctx, req).await?))
}

#[instrument(skip(service, req), fields(account_id = ctx.account_id(), content_type = %req.content_type))]
pub async fn upload_profile_image(
    State(service): State<AccountService>,
    ctx: Ctx,
    Json(req): Json<ProfileImageRequest>,
) -> Result<Json<AccountView>> {
    Ok(Json(service.upload_profile_image(&ctx, req).await?))
}
