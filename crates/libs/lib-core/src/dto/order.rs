//! # Order Data Transfer Objects
//!
//! - `POST /api/orders` - [`PlaceOrderRequest`] -> [`OrderView`]
//! - `GET /api/orders` -> `Vec<OrderView>`
//! - `GET /api/orders/{id}` -> [`OrderDetailsResponse`]
//! - `GET /api/admin/orders?status=` - [`OrderListQuery`]
//! - `POST /api/admin/orders/{id}/status` - [`UpdateOrderStatusRequest`]

use chrono::{DateTime, Utc};
use lib_utils::{validate_currency_code, validate_not_empty, validate_positive_amount};
use serde::{Deserialize, Serialize};

use super::FieldErrors;
use crate::error::Result;
use crate::model::store::models::{AdminWallet, Order, OrderDirection, OrderStatus};

/// New order.
///
/// A BUY pays out crypto and needs `wallet_id`; a SELL pays out fiat and
/// needs `payment_method_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaceOrderRequest {
    pub direction: OrderDirection,
    pub asset: String,
    pub network: String,
    pub fiat_currency: String,
    pub crypto_amount: f64,
    pub fiat_amount: f64,
    pub rate: f64,
    #[serde(default)]
    pub wallet_id: Option<i64>,
    #[serde(default)]
    pub payment_method_id: Option<i64>,
}

impl PlaceOrderRequest {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::default();
        errors.check("asset", validate_currency_code(&self.asset, "Asset"));
        errors.check("network", validate_not_empty(&self.network, "Network"));
        errors.check("fiat_currency", validate_currency_code(&self.fiat_currency, "Fiat currency"));
        errors.check("crypto_amount", validate_positive_amount(self.crypto_amount, "Crypto amount"));
        errors.check("fiat_amount", validate_positive_amount(self.fiat_amount, "Fiat amount"));
        errors.check("rate", validate_positive_amount(self.rate, "Rate"));

        match self.direction {
            OrderDirection::Buy if self.wallet_id.is_none() => {
                errors.push("wallet_id", "A payout wallet is required for buy orders");
            }
            OrderDirection::Sell if self.payment_method_id.is_none() => {
                errors.push("payment_method_id", "A payment method is required for sell orders");
            }
            _ => {}
        }
        errors.finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderView {
    /// Human-readable id, `CD-YYMMDD-XXXXXX`.
    pub id: String,
    pub direction: OrderDirection,
    pub asset: String,
    pub network: String,
    pub fiat_currency: String,
    pub crypto_amount: f64,
    pub fiat_amount: f64,
    pub rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method_id: Option<i64>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.human_id.clone(),
            direction: order.direction,
            asset: order.asset.clone(),
            network: order.network.clone(),
            fiat_currency: order.fiat_currency.clone(),
            crypto_amount: order.crypto_amount,
            fiat_amount: order.fiat_amount,
            rate: order.rate,
            wallet_id: order.wallet_id,
            payment_method_id: order.payment_method_id,
            status: order.status,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

/// Where the customer sends their payment for a PENDING order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DepositAddress {
    pub chain: String,
    pub currency: String,
    pub address: String,
}

impl From<&AdminWallet> for DepositAddress {
    fn from(wallet: &AdminWallet) -> Self {
        Self {
            chain: wallet.chain.clone(),
            currency: wallet.currency.clone(),
            address: wallet.address.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderDetailsResponse {
    pub order: OrderView,
    /// Only present while the order is PENDING and a deposit address is active.
    pub deposit_address: Option<DepositAddress>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderListQuery {
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn buy() -> PlaceOrderRequest {
        PlaceOrderRequest {
            direction: OrderDirection::Buy,
            asset: "USDT".to_string(),
            network: "TRC20".to_string(),
            fiat_currency: "GHS".to_string(),
            crypto_amount: 100.0,
            fiat_amount: 1550.0,
            rate: 15.5,
            wallet_id: Some(1),
            payment_method_id: None,
        }
    }

    #[test]
    fn test_valid_buy() {
        assert!(buy().validate().is_ok());
    }

    #[test]
    fn test_amounts_must_be_positive_and_finite() {
        let mut request = buy();
        request.crypto_amount = 0.0;
        request.rate = f64::NAN;

        match request.validate() {
            Err(AppError::Validation(errors)) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["crypto_amount", "rate"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_sell_requires_payment_method() {
        let mut request = buy();
        request.direction = OrderDirection::Sell;
        request.wallet_id = None;

        match request.validate() {
            Err(AppError::Validation(errors)) => assert_eq!(errors[0].field, "payment_method_id"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
