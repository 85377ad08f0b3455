//! # Admin DTOs

use serde::{Deserialize, Serialize};

use super::FieldErrors;
use crate::error::Result;
use crate::model::store::models::{AccountStatus, Role};

/// Largest page the account listing returns.
pub const MAX_PAGE_SIZE: i64 = 200;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

impl Default for AccountListQuery {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl AccountListQuery {
    /// `(limit, offset)` clamped to sane bounds.
    pub fn page(&self) -> (i64, i64) {
        (self.limit.clamp(1, MAX_PAGE_SIZE), self.offset.max(0))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateAccountRequest {
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub status: Option<AccountStatus>,
}

impl UpdateAccountRequest {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::default();
        if self.role.is_none() && self.status.is_none() {
            errors.push("role", "Nothing to update");
        }
        errors.finish()
    }
}

/// Dashboard counters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OverviewResponse {
    pub accounts: i64,
    pub pending_kyc: i64,
    pub pending_orders: i64,
    pub completed_orders: i64,
}
