//! # KYC Handlers
//!
//! - `GET /api/kyc` - caller's KYC status (never includes documents)
//! - `POST /api/kyc` - submit identity documents (base64, 1 to 3 files)

use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use lib_core::dto::{KycStatusResponse, KycSubmitRequest};
use lib_core::{Ctx, Result};
use tracing::instrument;

use crate::services::KycService;

/// **Route**: `GET /api/kyc`
///
/// Error (401): no session. An account without a submission gets
/// `UNVERIFIED`, not an error.
pub async fn get_status(State(service): State<KycService>, ctx: Option<Ctx>) -> Result<Json<KycStatusResponse>> {
    Ok(Json(service.get_status(ctx.as_ref()).await?))
}

/// **Route**: `POST /api/kyc`
///
/// Error (409): a PENDING or APPROVED submission already exists
#[instrument(skip(service, req), fields(account_id = ctx.account_id(), id_type = %req.id_type))]
pub async fn submit(
    State(service): State<KycService>,
    ctx: Ctx,
    Json(req): Json<KycSubmitRequest>,
) -> Result<(StatusCode, Json<KycStatusResponse>)> {
    let status = service.submit(&ctx, req).await?;
    Ok((StatusCode::CREATED, Json(status)))
}

#[cfg(test)]
mod tests {
    use crate::handlers::auth::tests::{bearer, create_verified_account, send, setup_test_db, test_app, test_config};
    use crate::storage::upload_body_limit;
    use crate::test_support::test_state;
    use axum::http::StatusCode;
    use lib_core::model::store::models::Role;
    use lib_utils::b64u_encode;
    use serde_json::json;

    fn document(size: usize) -> serde_json::Value {
        json!({ "content_type": "image/png", "data": b64u_encode(vec![7u8; size]) })
    }

    #[tokio::test]
    async fn test_submit_accepts_documents_above_default_body_limit() {
        let pool = setup_test_db().await;
        let config = test_config();
        let user = create_verified_account(&pool, "u@example.com", "Secret!", Role::User).await;

        let (status, body) = send(
            test_app(pool, config.clone()),
            "POST",
            "/api/kyc",
            Some(&bearer(&config, &user)),
            Some(json!({
                "id_type": "PASSPORT",
                "documents": [document(3 * 1024 * 1024), document(4 * 1024 * 1024)],
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "PENDING");
    }

    #[tokio::test]
    async fn test_oversized_body_gets_json_error() {
        let pool = setup_test_db().await;
        let config = test_config();
        let user = create_verified_account(&pool, "u@example.com", "Secret!", Role::User).await;
        let (state, _) = test_state(pool);
        let app = crate::server::create_router(state, vec![]);

        let (status, body) = send(
            app,
            "POST",
            "/api/account/profile/image",
            Some(&bearer(&config, &user)),
            Some(json!({
                "content_type": "image/png",
                "data": "A".repeat(upload_body_limit(1) + 1),
            })),
        )
        .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["code"], "PayloadTooLarge");
    }
}
