//! # KYC Service
//!
//! One identity submission per account. Owners see only the status summary;
//! document references are exposed exclusively through the admin views.

use std::sync::Arc;

use lib_core::dto::{KycAdminView, KycReviewRequest, KycStatusResponse, KycSubmitRequest};
use lib_core::model::store::models::{KycForSubmit, KycStatus};
use lib_core::model::store::{is_unique_violation, KycRepository};
use lib_core::{AppError, Ctx, DbPool, Result};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::storage::{decode_upload, ObjectStore, DOCUMENT_TYPES};

#[derive(Clone)]
pub struct KycService {
    db: DbPool,
    store: Arc<dyn ObjectStore>,
}

impl KycService {
    pub fn new(db: DbPool, store: Arc<dyn ObjectStore>) -> Self {
        Self { db, store }
    }

    /// Caller's KYC state. No submission on file is `UNVERIFIED`, not an error.
    pub async fn get_status(&self, ctx: Option<&Ctx>) -> Result<KycStatusResponse> {
        let ctx = ctx.ok_or(AppError::Unauthorized)?;

        let status = match KycRepository::find_by_account(&self.db, ctx.account_id()).await? {
            Some(submission) => KycStatusResponse::from(&submission),
            None => KycStatusResponse::unverified(),
        };
        Ok(status)
    }

    #[instrument(skip(self, req), fields(account_id = ctx.account_id(), documents = req.documents.len()))]
    pub async fn submit(&self, ctx: &Ctx, req: KycSubmitRequest) -> Result<KycStatusResponse> {
        req.validate()?;

        let existing = KycRepository::find_by_account(&self.db, ctx.account_id()).await?;
        if let Some(current) = &existing {
            if current.status != KycStatus::Rejected {
                return Err(AppError::Conflict(format!(
                    "A KYC submission is already {}",
                    current.status.as_str().to_lowercase()
                )));
            }
        }

        // Decode everything before the first write so a bad document stores nothing.
        let mut uploads = Vec::with_capacity(req.documents.len());
        for (i, document) in req.documents.iter().enumerate() {
            let field = format!("documents[{}]", i);
            uploads.push(decode_upload(&field, &document.content_type, &document.data, DOCUMENT_TYPES)?);
        }

        let mut document_urls = Vec::with_capacity(uploads.len());
        for upload in uploads {
            let key = format!("kyc/{}/{}.{}", ctx.account_id(), Uuid::new_v4(), upload.extension);
            document_urls.push(self.store.put(&key, upload.content_type, upload.bytes).await?);
        }

        let data = KycForSubmit {
            account_id: ctx.account_id(),
            id_type: req.id_type,
            id_number: req
                .id_number
                .as_deref()
                .map(str::trim)
                .map(str::to_string),
            document_urls,
        };

        let submission = if existing.is_some() {
            KycRepository::resubmit(&self.db, data)
                .await?
                .ok_or_else(|| AppError::Conflict("KYC submission changed concurrently".to_string()))?
        } else {
            KycRepository::create(&self.db, data).await.map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict("A KYC submission already exists".to_string())
                } else {
                    e.into()
                }
            })?
        };

        info!(submission = submission.id, resubmitted = existing.is_some(), "[KYC] Submission received");
        Ok(KycStatusResponse::from(&submission))
    }

    // region: --- Admin

    pub async fn admin_list(&self, ctx: &Ctx, status: Option<KycStatus>) -> Result<Vec<KycAdminView>> {
        ctx.require_admin()?;
        let submissions = KycRepository::list(&self.db, status).await?;
        Ok(submissions.iter().map(KycAdminView::from).collect())
    }

    #[instrument(skip(self, req), fields(admin_id = ctx.account_id()))]
    pub async fn admin_review(&self, ctx: &Ctx, id: i64, req: KycReviewRequest) -> Result<KycAdminView> {
        ctx.require_admin()?;
        req.validate()?;

        let submission = KycRepository::find_by_id(&self.db, id)
            .await?
            .ok_or_else(|| AppError::NotFound("KYC submission not found".to_string()))?;
        if submission.status != KycStatus::Pending {
            warn!(status = %submission.status, "[KYC] Review of a non-pending submission");
            return Err(AppError::Conflict(format!(
                "Submission is {}, only PENDING submissions can be reviewed",
                submission.status
            )));
        }

        let reason = req.reason.as_deref().map(str::trim).filter(|r| !r.is_empty());
        let reviewed = KycRepository::review(&self.db, id, req.decision.status(), reason)
            .await?
            .ok_or_else(|| AppError::Conflict("Submission was reviewed concurrently".to_string()))?;

        info!(submission = id, status = %reviewed.status, "[KYC] Submission reviewed");
        Ok(KycAdminView::from(&reviewed))
    }

    // endregion: --- Admin
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_verified_account, setup_test_db, MemoryObjectStore};
    use lib_core::dto::{DocumentUpload, KycDecision};
    use lib_core::model::store::models::{IdType, Role};

    struct Fixture {
        store: Arc<MemoryObjectStore>,
        service: KycService,
        user: Ctx,
        admin: Ctx,
    }

    async fn fixture() -> Fixture {
        let db = setup_test_db().await;
        let user = create_verified_account(&db, "kyc@example.com", "Secret!", Role::User).await;
        let admin = create_verified_account(&db, "boss@example.com", "Secret!", Role::Admin).await;
        let store = Arc::new(MemoryObjectStore::default());

        Fixture {
            service: KycService::new(db, store.clone()),
            store,
            user: Ctx::new(user.id, Role::User),
            admin: Ctx::new(admin.id, Role::Admin),
        }
    }

    fn request(documents: usize) -> KycSubmitRequest {
        KycSubmitRequest {
            id_type: IdType::Passport,
            id_number: Some(" G1234567 ".to_string()),
            documents: (0..documents)
                .map(|_| DocumentUpload {
                    content_type: "image/jpeg".to_string(),
                    data: "data:image/jpeg;base64,/9j/4AAQ".to_string(),
                })
                .collect(),
        }
    }

    fn reject(reason: &str) -> KycReviewRequest {
        KycReviewRequest {
            decision: KycDecision::Reject,
            reason: Some(reason.to_string()),
        }
    }

    #[tokio::test]
    async fn test_status_requires_session() {
        let f = fixture().await;
        assert!(matches!(
            f.service.get_status(None).await.unwrap_err(),
            AppError::Unauthorized
        ));

        let status = f.service.get_status(Some(&f.user)).await.unwrap();
        assert_eq!(status.status, KycStatus::Unverified);
        assert!(status.submission.is_none());
    }

    #[tokio::test]
    async fn test_status_never_exposes_documents() {
        let f = fixture().await;
        let submitted = f.service.submit(&f.user, request(2)).await.unwrap();
        assert_eq!(submitted.status, KycStatus::Pending);

        let pending = serde_json::to_value(f.service.get_status(Some(&f.user)).await.unwrap()).unwrap();
        assert!(!pending.to_string().contains("memory://"));

        let id = submitted.submission.unwrap().id;
        f.service
            .admin_review(
                &f.admin,
                id,
                KycReviewRequest {
                    decision: KycDecision::Approve,
                    reason: None,
                },
            )
            .await
            .unwrap();

        let approved = f.service.get_status(Some(&f.user)).await.unwrap();
        assert_eq!(approved.status, KycStatus::Approved);
        assert!(!serde_json::to_string(&approved).unwrap().contains("memory://"));
    }

    #[tokio::test]
    async fn test_documents_are_stored_per_account() {
        let f = fixture().await;
        f.service.submit(&f.user, request(3)).await.unwrap();

        let keys = f.store.keys();
        assert_eq!(keys.len(), 3);
        let prefix = format!("kyc/{}/", f.user.account_id());
        assert!(keys.iter().all(|k| k.starts_with(&prefix) && k.ends_with(".jpg")));

        let listed = f.service.admin_list(&f.admin, Some(KycStatus::Pending)).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].document_urls.len(), 3);
        assert_eq!(listed[0].id_number.as_deref(), Some("G1234567"));
    }

    #[tokio::test]
    async fn test_second_submission_conflicts_until_rejected() {
        let f = fixture().await;
        let first = f.service.submit(&f.user, request(1)).await.unwrap();

        assert!(matches!(
            f.service.submit(&f.user, request(1)).await.unwrap_err(),
            AppError::Conflict(_)
        ));

        let id = first.submission.unwrap().id;
        let rejected = f.service.admin_review(&f.admin, id, reject("Blurry photo")).await.unwrap();
        assert_eq!(rejected.status, KycStatus::Rejected);
        assert_eq!(rejected.rejection_reason.as_deref(), Some("Blurry photo"));

        let again = f.service.submit(&f.user, request(2)).await.unwrap();
        assert_eq!(again.status, KycStatus::Pending);
        let summary = again.submission.unwrap();
        assert_eq!(summary.id, id);
        assert!(summary.rejection_reason.is_none());
    }

    #[tokio::test]
    async fn test_review_rules() {
        let f = fixture().await;
        let id = f.service.submit(&f.user, request(1)).await.unwrap().submission.unwrap().id;

        assert!(matches!(
            f.service.admin_review(&f.user, id, reject("no")).await.unwrap_err(),
            AppError::Unauthorized
        ));
        assert!(matches!(
            f.service
                .admin_review(
                    &f.admin,
                    id,
                    KycReviewRequest {
                        decision: KycDecision::Reject,
                        reason: None,
                    },
                )
                .await
                .unwrap_err(),
            AppError::Validation(_)
        ));
        assert!(matches!(
            f.service.admin_review(&f.admin, 9999, reject("x")).await.unwrap_err(),
            AppError::NotFound(_)
        ));

        f.service.admin_review(&f.admin, id, reject("Expired ID")).await.unwrap();
        assert!(matches!(
            f.service.admin_review(&f.admin, id, reject("again")).await.unwrap_err(),
            AppError::Conflict(_)
        ));
    }

    #[tokio::test]
    async fn test_bad_document_stores_nothing() {
        let f = fixture().await;
        let mut req = request(2);
        req.documents[1].content_type = "text/html".to_string();

        let err = f.service.submit(&f.user, req).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(f.store.keys().is_empty());
    }
}
