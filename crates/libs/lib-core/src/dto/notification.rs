//! # Notification DTOs
//!
//! `GET /api/admin/notifications?since=<rfc3339>` returns the events created
//! after `since`, oldest first, and the watermark to send on the next poll.
//! A missing or unparsable `since` is treated as a first poll.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::store::models::{KycStatus, KycSubmission, Order, OrderDirection, OrderStatus};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckNewQuery {
    #[serde(default)]
    pub since: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationEvent {
    Order {
        id: String,
        account_id: i64,
        direction: OrderDirection,
        asset: String,
        fiat_currency: String,
        fiat_amount: f64,
        status: OrderStatus,
        created_at: DateTime<Utc>,
    },
    Kyc {
        id: i64,
        account_id: i64,
        status: KycStatus,
        created_at: DateTime<Utc>,
    },
}

impl NotificationEvent {
    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            NotificationEvent::Order { created_at, .. } | NotificationEvent::Kyc { created_at, .. } => {
                *created_at
            }
        }
    }
}

impl From<&Order> for NotificationEvent {
    fn from(order: &Order) -> Self {
        NotificationEvent::Order {
            id: order.human_id.clone(),
            account_id: order.account_id,
            direction: order.direction,
            asset: order.asset.clone(),
            fiat_currency: order.fiat_currency.clone(),
            fiat_amount: order.fiat_amount,
            status: order.status,
            created_at: order.created_at,
        }
    }
}

impl From<&KycSubmission> for NotificationEvent {
    fn from(submission: &KycSubmission) -> Self {
        NotificationEvent::Kyc {
            id: submission.id,
            account_id: submission.account_id,
            status: submission.status,
            created_at: submission.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckNewResponse {
    pub events: Vec<NotificationEvent>,
    /// Pass back as `since` on the next poll.
    pub checked_at: DateTime<Utc>,
}

impl CheckNewResponse {
    pub fn empty(checked_at: DateTime<Utc>) -> Self {
        Self {
            events: Vec::new(),
            checked_at,
        }
    }
}
