//! # Wallet and Payment Method DTOs
//!
//! Customer payout destinations and the admin deposit-address registry.

use chrono::{DateTime, Utc};
use lib_utils::{validate_currency_code, validate_not_empty};
use serde::{Deserialize, Serialize};

use super::FieldErrors;
use crate::error::Result;
use crate::model::store::models::{AdminWallet, PaymentMethod, PaymentMethodType, Wallet};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaveWalletRequest {
    pub asset: String,
    pub network: String,
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub is_default: bool,
}

impl SaveWalletRequest {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::default();
        errors.check("asset", validate_currency_code(&self.asset, "Asset"));
        errors.check("network", validate_not_empty(&self.network, "Network"));
        errors.check("name", validate_not_empty(&self.name, "Name"));
        errors.check("address", validate_not_empty(&self.address, "Address"));
        errors.finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WalletView {
    pub id: i64,
    pub asset: String,
    pub network: String,
    pub name: String,
    pub address: String,
    pub is_default: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<&Wallet> for WalletView {
    fn from(wallet: &Wallet) -> Self {
        Self {
            id: wallet.id,
            asset: wallet.asset.clone(),
            network: wallet.network.clone(),
            name: wallet.name.clone(),
            address: wallet.address.clone(),
            is_default: wallet.is_default,
            updated_at: wallet.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SavePaymentMethodRequest {
    pub method_type: PaymentMethodType,
    pub provider: String,
    pub account_name: String,
    pub account_number: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

impl SavePaymentMethodRequest {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::default();
        errors.check("provider", validate_not_empty(&self.provider, "Provider"));
        errors.check("account_name", validate_not_empty(&self.account_name, "Account name"));
        errors.check("account_number", validate_not_empty(&self.account_number, "Account number"));
        errors.finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentMethodView {
    pub id: i64,
    pub method_type: PaymentMethodType,
    pub provider: String,
    pub account_name: String,
    pub account_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub is_default: bool,
}

impl From<&PaymentMethod> for PaymentMethodView {
    fn from(method: &PaymentMethod) -> Self {
        Self {
            id: method.id,
            method_type: method.method_type,
            provider: method.provider.clone(),
            account_name: method.account_name.clone(),
            account_number: method.account_number.clone(),
            label: method.label.clone(),
            is_default: method.is_default,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaveAdminWalletRequest {
    pub chain: String,
    pub currency: String,
    pub address: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl SaveAdminWalletRequest {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::default();
        errors.check("chain", validate_not_empty(&self.chain, "Chain"));
        errors.check("currency", validate_currency_code(&self.currency, "Currency"));
        errors.check("address", validate_not_empty(&self.address, "Address"));
        errors.finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminWalletView {
    pub id: i64,
    pub chain: String,
    pub currency: String,
    pub address: String,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<&AdminWallet> for AdminWalletView {
    fn from(wallet: &AdminWallet) -> Self {
        Self {
            id: wallet.id,
            chain: wallet.chain.clone(),
            currency: wallet.currency.clone(),
            address: wallet.address.clone(),
            is_active: wallet.is_active,
            updated_at: wallet.updated_at,
        }
    }
}
