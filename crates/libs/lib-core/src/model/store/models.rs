use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// Declares an enum stored as uppercase TEXT and serialized the same way.
///
/// Rows carrying an unknown value decode to `fallback` instead of failing the
/// whole query; pick the most restrictive variant as fallback.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident (fallback = $fallback:ident) {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_uppercase().as_str() {
                    $( $text => Ok($name::$variant), )+
                    _ => Err(format!("Invalid {}: {}", stringify!($name), s)),
                }
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                use std::str::FromStr;
                $name::from_str(&s).unwrap_or($name::$fallback)
            }
        }
    };
}

// region: --- Accounts

text_enum! {
    pub enum Role (fallback = User) {
        User => "USER",
        Admin => "ADMIN",
    }
}

text_enum! {
    pub enum AccountStatus (fallback = Banned) {
        Active => "ACTIVE",
        /// Soft ban: the row stays, login is refused.
        Banned => "BANNED",
    }
}

/// Account entity representing a complete account record from the database.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub image: Option<String>,
    pub email_verified_at: Option<DateTime<Utc>>,
    #[sqlx(try_from = "String")]
    pub role: Role,
    #[sqlx(try_from = "String")]
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl Account {
    pub fn is_verified(&self) -> bool {
        self.email_verified_at.is_some()
    }
}

/// Data structure for creating a new account.
///
/// Password should be hashed and email normalized before creating.
#[derive(Debug, Clone)]
pub struct AccountForCreate {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
}

/// Data structure for updating an existing account.
///
/// All fields are optional - only provided fields will be updated.
#[derive(Debug, Clone, Default)]
pub struct AccountForUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
    pub status: Option<AccountStatus>,
}

impl AccountForUpdate {
    /// Create a new empty `AccountForUpdate` instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn first_name(mut self, first_name: String) -> Self {
        self.first_name = Some(first_name);
        self
    }

    pub fn last_name(mut self, last_name: String) -> Self {
        self.last_name = Some(last_name);
        self
    }

    pub fn image(mut self, image: String) -> Self {
        self.image = Some(image);
        self
    }

    pub fn password_hash(mut self, password_hash: String) -> Self {
        self.password_hash = Some(password_hash);
        self
    }

    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn status(mut self, status: AccountStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.image.is_none()
            && self.password_hash.is_none()
            && self.role.is_none()
            && self.status.is_none()
    }
}

// endregion: --- Accounts

// region: --- One-time tokens

/// Verification or password-reset token row. Both tables share this shape.
#[derive(Debug, Clone, FromRow)]
pub struct OneTimeToken {
    pub id: i64,
    pub email: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl OneTimeToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

// endregion: --- One-time tokens

// region: --- KYC

text_enum! {
    pub enum KycStatus (fallback = Unverified) {
        /// No submission on file; only ever produced for the status query.
        Unverified => "UNVERIFIED",
        Pending => "PENDING",
        Approved => "APPROVED",
        Rejected => "REJECTED",
    }
}

text_enum! {
    pub enum IdType (fallback = NationalId) {
        Passport => "PASSPORT",
        NationalId => "NATIONAL_ID",
        DriversLicense => "DRIVERS_LICENSE",
        VoterId => "VOTER_ID",
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct KycSubmission {
    pub id: i64,
    pub account_id: i64,
    #[sqlx(try_from = "String")]
    pub id_type: IdType,
    pub id_number: Option<String>,
    /// Storage references of the uploaded documents. Admin-only.
    pub document_urls: Json<Vec<String>>,
    #[sqlx(try_from = "String")]
    pub status: KycStatus,
    pub rejection_reason: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct KycForSubmit {
    pub account_id: i64,
    pub id_type: IdType,
    pub id_number: Option<String>,
    pub document_urls: Vec<String>,
}

// endregion: --- KYC

// region: --- Orders

text_enum! {
    pub enum OrderDirection (fallback = Buy) {
        /// Customer pays fiat, receives crypto.
        Buy => "BUY",
        /// Customer sends crypto, receives fiat.
        Sell => "SELL",
    }
}

text_enum! {
    pub enum OrderStatus (fallback = Rejected) {
        Pending => "PENDING",
        Paid => "PAID",
        Rejected => "REJECTED",
        Completed => "COMPLETED",
    }
}

impl OrderStatus {
    /// Forward-only transitions; REJECTED and COMPLETED are terminal.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Paid) | (Pending, Rejected) | (Pending, Completed)
                | (Paid, Completed) | (Paid, Rejected)
        )
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Order {
    pub id: i64,
    pub human_id: String,
    pub account_id: i64,
    #[sqlx(try_from = "String")]
    pub direction: OrderDirection,
    pub asset: String,
    pub network: String,
    pub fiat_currency: String,
    pub crypto_amount: f64,
    pub fiat_amount: f64,
    pub rate: f64,
    pub wallet_id: Option<i64>,
    pub payment_method_id: Option<i64>,
    #[sqlx(try_from = "String")]
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Currency whose platform deposit address the customer pays into.
    pub fn deposit_currency(&self) -> &str {
        match self.direction {
            OrderDirection::Buy => &self.fiat_currency,
            OrderDirection::Sell => &self.asset,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrderForCreate {
    pub human_id: String,
    pub account_id: i64,
    pub direction: OrderDirection,
    pub asset: String,
    pub network: String,
    pub fiat_currency: String,
    pub crypto_amount: f64,
    pub fiat_amount: f64,
    pub rate: f64,
    pub wallet_id: Option<i64>,
    pub payment_method_id: Option<i64>,
}

// endregion: --- Orders

// region: --- Wallets and payment methods

#[derive(Debug, Clone, FromRow)]
pub struct Wallet {
    pub id: i64,
    pub account_id: i64,
    pub asset: String,
    pub network: String,
    pub name: String,
    pub address: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct WalletForUpsert {
    pub account_id: i64,
    pub asset: String,
    pub network: String,
    pub name: String,
    pub address: String,
    pub is_default: bool,
}

text_enum! {
    pub enum PaymentMethodType (fallback = BankAccount) {
        MobileMoney => "MOBILE_MONEY",
        BankAccount => "BANK_ACCOUNT",
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct PaymentMethod {
    pub id: i64,
    pub account_id: i64,
    #[sqlx(try_from = "String")]
    pub method_type: PaymentMethodType,
    pub provider: String,
    pub account_name: String,
    pub account_number: String,
    pub label: Option<String>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct PaymentMethodForSave {
    pub method_type: PaymentMethodType,
    pub provider: String,
    pub account_name: String,
    pub account_number: String,
    pub label: Option<String>,
    pub is_default: bool,
}

/// Platform-controlled deposit destination for one currency.
#[derive(Debug, Clone, FromRow)]
pub struct AdminWallet {
    pub id: i64,
    pub chain: String,
    pub currency: String,
    pub address: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct AdminWalletForUpsert {
    pub chain: String,
    pub currency: String,
    pub address: String,
    pub is_active: bool,
}

// endregion: --- Wallets and payment methods

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_transitions_only_move_forward() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Paid));
        assert!(Pending.can_transition_to(Completed));
        assert!(Paid.can_transition_to(Completed));
        assert!(!Paid.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Paid));
        assert!(!Rejected.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn test_text_enum_parsing() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::from("SUPERUSER".to_string()), Role::User);
        assert_eq!(AccountStatus::from("??".to_string()), AccountStatus::Banned);
        assert_eq!(IdType::DriversLicense.as_str(), "DRIVERS_LICENSE");
        assert_eq!(
            serde_json::to_string(&PaymentMethodType::MobileMoney).unwrap(),
            "\"MOBILE_MONEY\""
        );
    }

    #[test]
    fn test_deposit_currency_follows_direction() {
        let now = Utc::now();
        let mut order = Order {
            id: 1,
            human_id: "CD-240101-ABCDEF".to_string(),
            account_id: 1,
            direction: OrderDirection::Buy,
            asset: "USDT".to_string(),
            network: "TRC20".to_string(),
            fiat_currency: "GHS".to_string(),
            crypto_amount: 10.0,
            fiat_amount: 150.0,
            rate: 15.0,
            wallet_id: Some(1),
            payment_method_id: None,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(order.deposit_currency(), "GHS");
        order.direction = OrderDirection::Sell;
        assert_eq!(order.deposit_currency(), "USDT");
    }
}
