//! # Session Resolution Middleware
//!
//! Reads `Authorization: Bearer <jwt>`, validates the token and loads the
//! account. When the account exists and is not banned a [`Ctx`] carrying its
//! current role is inserted into request extensions.
//!
//! The middleware never rejects a request. Handlers decide: extracting `Ctx`
//! fails with `401 Unauthorized` when no session was resolved, while
//! `Option<Ctx>` lets a handler run without one.
//!
//! ```rust,ignore
//! async fn profile(ctx: Ctx) -> Result<Json<AccountView>> { ... }
//! async fn check_new(ctx: Option<Ctx>, ...) -> Json<CheckNewResponse> { ... }
//! ```

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use lib_auth::decode_jwt;
use lib_core::model::store::models::AccountStatus;
use lib_core::model::store::AccountRepository;
use lib_core::Ctx;
use tracing::{debug, warn};

use crate::server::AppState;

pub async fn resolve_session(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string());

    if let Some(token) = token {
        if let Some(ctx) = ctx_from_token(&state, &token).await {
            req.extensions_mut().insert(ctx);
        }
    }

    next.run(req).await
}

async fn ctx_from_token(state: &AppState, token: &str) -> Option<Ctx> {
    let claims = match decode_jwt(token, &state.config.jwt_secret) {
        Ok(claims) => claims,
        Err(e) => {
            debug!("[AUTH] Ignoring invalid session token: {}", e);
            return None;
        }
    };

    let account_id: i64 = claims.sub.parse().ok()?;

    match AccountRepository::find_by_id(&state.db, account_id).await {
        Ok(Some(account)) if account.status == AccountStatus::Active => {
            debug!("[AUTH] Session resolved for account {}", account.id);
            Some(Ctx::new(account.id, account.role))
        }
        Ok(Some(_)) => {
            warn!("[AUTH] Session presented for banned account {}", account_id);
            None
        }
        Ok(None) => None,
        Err(e) => {
            warn!("[AUTH] Session lookup failed: {}", e);
            None
        }
    }
}
