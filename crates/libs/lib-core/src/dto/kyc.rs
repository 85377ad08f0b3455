//! # KYC Data Transfer Objects
//!
//! The owner-facing [`KycStatusResponse`] has no field for document
//! references; only the admin view [`KycAdminView`] carries them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::FieldErrors;
use crate::error::Result;
use crate::model::store::models::{IdType, KycStatus, KycSubmission};

/// Most documents accepted per submission.
pub const MAX_KYC_DOCUMENTS: usize = 3;

/// One identity document, base64 encoded (a `data:` URL prefix is accepted).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentUpload {
    pub content_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KycSubmitRequest {
    pub id_type: IdType,
    #[serde(default)]
    pub id_number: Option<String>,
    pub documents: Vec<DocumentUpload>,
}

impl KycSubmitRequest {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::default();
        if self.documents.is_empty() || self.documents.len() > MAX_KYC_DOCUMENTS {
            errors.push(
                "documents",
                format!("Between 1 and {} documents are required", MAX_KYC_DOCUMENTS),
            );
        }
        if let Some(number) = &self.id_number {
            if number.trim().is_empty() {
                errors.push("id_number", "ID number cannot be blank");
            }
        }
        errors.finish()
    }
}

/// The caller's own submission, without document references.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KycSummary {
    pub id: i64,
    pub id_type: IdType,
    pub status: KycStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    pub submitted_at: DateTime<Utc>,
}

impl From<&KycSubmission> for KycSummary {
    fn from(submission: &KycSubmission) -> Self {
        Self {
            id: submission.id,
            id_type: submission.id_type,
            status: submission.status,
            rejection_reason: submission.rejection_reason.clone(),
            reviewed_at: submission.reviewed_at,
            submitted_at: submission.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KycStatusResponse {
    pub status: KycStatus,
    pub submission: Option<KycSummary>,
}

impl KycStatusResponse {
    pub fn unverified() -> Self {
        Self {
            status: KycStatus::Unverified,
            submission: None,
        }
    }
}

impl From<&KycSubmission> for KycStatusResponse {
    fn from(submission: &KycSubmission) -> Self {
        Self {
            status: submission.status,
            submission: Some(KycSummary::from(submission)),
        }
    }
}

/// Full submission for reviewers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KycAdminView {
    pub id: i64,
    pub account_id: i64,
    pub id_type: IdType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_number: Option<String>,
    pub document_urls: Vec<String>,
    pub status: KycStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&KycSubmission> for KycAdminView {
    fn from(submission: &KycSubmission) -> Self {
        Self {
            id: submission.id,
            account_id: submission.account_id,
            id_type: submission.id_type,
            id_number: submission.id_number.clone(),
            document_urls: submission.document_urls.0.clone(),
            status: submission.status,
            rejection_reason: submission.rejection_reason.clone(),
            reviewed_at: submission.reviewed_at,
            created_at: submission.created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct KycListQuery {
    #[serde(default)]
    pub status: Option<KycStatus>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KycDecision {
    Approve,
    Reject,
}

impl KycDecision {
    pub fn status(self) -> KycStatus {
        match self {
            KycDecision::Approve => KycStatus::Approved,
            KycDecision::Reject => KycStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KycReviewRequest {
    pub decision: KycDecision,
    #[serde(default)]
    pub reason: Option<String>,
}

impl KycReviewRequest {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::default();
        let has_reason = self.reason.as_deref().is_some_and(|r| !r.trim().is_empty());
        if self.decision == KycDecision::Reject && !has_reason {
            errors.push("reason", "A reason is required when rejecting");
        }
        errors.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::types::Json;

    fn submission(status: KycStatus) -> KycSubmission {
        let now = Utc::now();
        KycSubmission {
            id: 1,
            account_id: 1,
            id_type: IdType::NationalId,
            id_number: Some("GHA-000000000-0".to_string()),
            document_urls: Json(vec!["/uploads/kyc/1/front.png".to_string()]),
            status,
            rejection_reason: None,
            reviewed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_response_never_carries_documents() {
        for status in [KycStatus::Pending, KycStatus::Approved] {
            let json = serde_json::to_string(&KycStatusResponse::from(&submission(status))).unwrap();
            assert!(!json.contains("uploads"));
            assert!(!json.contains("document"));
        }
    }

    #[test]
    fn test_reject_needs_reason() {
        let request = KycReviewRequest {
            decision: KycDecision::Reject,
            reason: Some("  ".to_string()),
        };
        assert!(request.validate().is_err());

        let request = KycReviewRequest {
            decision: KycDecision::Approve,
            reason: None,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_document_count_bounds() {
        let doc = DocumentUpload {
            content_type: "image/png".to_string(),
            data: "aGk=".to_string(),
        };
        let mut request = KycSubmitRequest {
            id_type: IdType::Passport,
            id_number: None,
            documents: vec![],
        };
        assert!(request.validate().is_err());
        request.documents = vec![doc.clone(); 4];
        assert!(request.validate().is_err());
        request.documents = vec![doc; 2];
        assert!(request.validate().is_ok());
    }
}
