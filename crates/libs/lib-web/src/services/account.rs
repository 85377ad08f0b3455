//! # Account Service
//!
//! Registration, email verification, login, password reset/change and
//! profile maintenance.
//!
//! ## Lifecycle
//!
//! ```text
//! register ──> UNVERIFIED ──(verification token redeemed)──> VERIFIED
//!
//! token: ISSUED ──redeemed──> CONSUMED
//!        ISSUED ──expired───> EXPIRED
//! ```
//!
//! A one-time token is single use: redemption deletes it inside the same
//! transaction that applies its effect, and the delete must hit exactly one
//! row. A second redemption, concurrent or later, fails with
//! [`AppError::TokenNotFound`].

use std::sync::Arc;

use chrono::Utc;
use lib_auth::{encode_jwt, generate_token, hash_password, token_expiry, verify_password};
use lib_core::dto::{
    AccountView, AuthResponse, ChangePasswordRequest, EmailRequest, LoginRequest, ProfileImageRequest,
    RegisterRequest, ResetPasswordRequest, UpdateProfileRequest,
};
use lib_core::model::store::models::{Account, AccountForCreate, AccountForUpdate, AccountStatus, OneTimeToken};
use lib_core::model::store::{is_unique_violation, AccountRepository, TokenKind, TokenRepository};
use lib_core::{AppError, Config, Ctx, DbPool, Result};
use lib_utils::normalize_email;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::mail::{password_changed_email, password_reset_email, verification_email, MailMessage, Mailer};
use crate::storage::{decode_upload, ObjectStore, IMAGE_TYPES};

#[derive(Clone)]
pub struct AccountService {
    db: DbPool,
    config: Config,
    mailer: Arc<dyn Mailer>,
    store: Arc<dyn ObjectStore>,
}

impl AccountService {
    pub fn new(db: DbPool, config: Config, mailer: Arc<dyn Mailer>, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            db,
            config,
            mailer,
            store,
        }
    }

    // region: --- Registration and verification

    /// Create an unverified account and mail its verification link.
    ///
    /// The account is kept even when the mail cannot be sent; the caller
    /// gets [`AppError::Upstream`] and can ask for a resend.
    #[instrument(skip_all, fields(email = %req.email))]
    pub async fn register(&self, req: RegisterRequest) -> Result<AccountView> {
        req.validate()?;
        let email = normalize_email(&req.email);

        if AccountRepository::find_by_email(&self.db, &email).await?.is_some() {
            warn!("[REGISTER] Email already registered");
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = hash_password(&req.password).map_err(|e| AppError::Internal(e.to_string()))?;

        let account = AccountRepository::create(
            &self.db,
            AccountForCreate {
                email,
                password_hash,
                first_name: req.first_name.trim().to_string(),
                last_name: req.last_name.trim().to_string(),
            },
        )
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Email already registered".to_string())
            } else {
                e.into()
            }
        })?;

        info!("[REGISTER] Account {} created", account.id);
        self.send_verification(&account).await?;

        Ok(AccountView::from(&account))
    }

    /// Issue a fresh verification token, replacing the previous one.
    #[instrument(skip_all, fields(email = %req.email))]
    pub async fn resend_verification(&self, req: EmailRequest) -> Result<()> {
        req.validate()?;
        let email = normalize_email(&req.email);

        let account = AccountRepository::find_by_email(&self.db, &email)
            .await?
            .ok_or(AppError::EmailNotFound)?;
        if account.is_verified() {
            return Err(AppError::Conflict("Email is already verified".to_string()));
        }

        self.send_verification(&account).await
    }

    #[instrument(skip_all)]
    pub async fn verify_email(&self, token: &str) -> Result<()> {
        let now = Utc::now();
        let stored = self.live_token(TokenKind::Verification, token).await?;

        let account = AccountRepository::find_by_email(&self.db, &stored.email)
            .await?
            .ok_or(AppError::EmailNotFound)?;

        let mut tx = self.db.begin().await?;
        if !TokenRepository::consume(&mut tx, TokenKind::Verification, stored.id).await? {
            return Err(AppError::TokenNotFound);
        }
        AccountRepository::mark_email_verified(&mut *tx, &account.email, now).await?;
        tx.commit().await?;

        info!("[VERIFY] Account {} verified", account.id);
        Ok(())
    }

    async fn send_verification(&self, account: &Account) -> Result<()> {
        let ttl = self.config.verification_token_ttl_minutes;
        let token = generate_token();
        TokenRepository::replace_for_email(
            &self.db,
            TokenKind::Verification,
            &account.email,
            &token,
            token_expiry(Utc::now(), ttl),
        )
        .await?;

        let message = verification_email(&self.config.app_url, &account.email, &account.first_name, &token, ttl);
        self.send_required(message).await
    }

    // endregion: --- Registration and verification

    // region: --- Login

    /// Authenticate and issue a session token.
    ///
    /// Check order: an unverified account fails with
    /// [`AppError::EmailNotVerified`] before the password is looked at; then
    /// credentials; then the ban flag.
    #[instrument(skip_all, fields(email = %req.email))]
    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse> {
        req.validate()?;
        let email = normalize_email(&req.email);

        let mut account = match AccountRepository::find_by_email(&self.db, &email).await? {
            Some(account) if !account.is_verified() => {
                warn!("[LOGIN] Email not verified for account {}", account.id);
                return Err(AppError::EmailNotVerified);
            }
            Some(account) => account,
            None => {
                debug!("[LOGIN] Unknown email");
                return Err(AppError::InvalidCredentials);
            }
        };

        let valid = verify_password(&req.password, &account.password_hash)
            .map_err(|e| AppError::AuthFailure(e.to_string()))?;
        if !valid {
            warn!("[LOGIN] Invalid password for account {}", account.id);
            return Err(AppError::InvalidCredentials);
        }

        if account.status == AccountStatus::Banned {
            warn!("[LOGIN] Banned account {} attempted login", account.id);
            return Err(AppError::AccountBanned);
        }

        let token = encode_jwt(
            account.id,
            &account.email,
            account.role.as_str(),
            &self.config.jwt_secret,
            self.config.jwt_expiration_hours,
        )
        .map_err(|e| AppError::AuthFailure(e.to_string()))?;

        if let Err(e) = AccountRepository::update_last_login(&self.db, account.id).await {
            warn!("[LOGIN] Could not record last login: {}", e);
        } else {
            account.last_login = Some(Utc::now());
        }

        info!("[LOGIN] Account {} authenticated", account.id);
        Ok(AuthResponse {
            account: AccountView::from(&account),
            token,
            message: "Login successful".to_string(),
        })
    }

    // endregion: --- Login

    // region: --- Passwords

    #[instrument(skip_all, fields(email = %req.email))]
    pub async fn request_password_reset(&self, req: EmailRequest) -> Result<()> {
        req.validate()?;
        let email = normalize_email(&req.email);

        let account = AccountRepository::find_by_email(&self.db, &email)
            .await?
            .ok_or(AppError::EmailNotFound)?;

        let ttl = self.config.reset_token_ttl_minutes;
        let token = generate_token();
        TokenRepository::replace_for_email(
            &self.db,
            TokenKind::PasswordReset,
            &account.email,
            &token,
            token_expiry(Utc::now(), ttl),
        )
        .await?;

        let message = password_reset_email(&self.config.app_url, &account.email, &account.first_name, &token, ttl);
        self.send_required(message).await
    }

    #[instrument(skip_all)]
    pub async fn reset_password(&self, req: ResetPasswordRequest) -> Result<()> {
        req.validate()?;
        let stored = self.live_token(TokenKind::PasswordReset, &req.token).await?;

        let account = AccountRepository::find_by_email(&self.db, &stored.email)
            .await?
            .ok_or(AppError::EmailNotFound)?;

        let password_hash = hash_password(&req.password).map_err(|e| AppError::Internal(e.to_string()))?;

        let mut tx = self.db.begin().await?;
        if !TokenRepository::consume(&mut tx, TokenKind::PasswordReset, stored.id).await? {
            return Err(AppError::TokenNotFound);
        }
        AccountRepository::set_password_by_email(&mut *tx, &account.email, &password_hash).await?;
        tx.commit().await?;

        info!("[RESET] Password reset for account {}", account.id);
        self.send_best_effort(password_changed_email(&account.email, &account.first_name))
            .await;
        Ok(())
    }

    #[instrument(skip_all)]
    pub async fn change_password(&self, ctx: Option<&Ctx>, req: ChangePasswordRequest) -> Result<()> {
        let ctx = ctx.ok_or(AppError::Unauthorized)?;
        req.validate()?;

        let account = self.load(ctx).await?;
        let matches = verify_password(&req.current_password, &account.password_hash)
            .map_err(|e| AppError::AuthFailure(e.to_string()))?;
        if !matches {
            return Err(AppError::IncorrectPassword);
        }

        let password_hash = hash_password(&req.new_password).map_err(|e| AppError::Internal(e.to_string()))?;
        AccountRepository::update(&self.db, account.id, AccountForUpdate::new().password_hash(password_hash))
            .await?;

        info!("[PASSWORD] Password changed for account {}", account.id);
        self.send_best_effort(password_changed_email(&account.email, &account.first_name))
            .await;
        Ok(())
    }

    // endregion: --- Passwords

    // region: --- Profile

    pub async fn profile(&self, ctx: &Ctx) -> Result<AccountView> {
        let account = self.load(ctx).await?;
        Ok(AccountView::from(&account))
    }

    pub async fn update_profile(&self, ctx: &Ctx, req: UpdateProfileRequest) -> Result<AccountView> {
        req.validate()?;

        let account = AccountRepository::update(
            &self.db,
            ctx.account_id(),
            AccountForUpdate::new()
                .first_name(req.first_name.trim().to_string())
                .last_name(req.last_name.trim().to_string()),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;

        Ok(AccountView::from(&account))
    }

    pub async fn upload_profile_image(&self, ctx: &Ctx, req: ProfileImageRequest) -> Result<AccountView> {
        let upload = decode_upload("data", &req.content_type, &req.data, IMAGE_TYPES)?;
        let key = format!("profile/{}/{}.{}", ctx.account_id(), Uuid::new_v4(), upload.extension);

        let reference = self.store.put(&key, upload.content_type, upload.bytes).await?;

        let account = AccountRepository::update(&self.db, ctx.account_id(), AccountForUpdate::new().image(reference))
            .await?
            .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;

        Ok(AccountView::from(&account))
    }

    // endregion: --- Profile

    // region: --- Helpers

    async fn load(&self, ctx: &Ctx) -> Result<Account> {
        AccountRepository::find_by_id(&self.db, ctx.account_id())
            .await?
            .ok_or_else(|| AppError::NotFound("Account not found".to_string()))
    }

    /// Look up a token that exists and has not expired.
    async fn live_token(&self, kind: TokenKind, token: &str) -> Result<OneTimeToken> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::TokenNotFound);
        }

        let stored = TokenRepository::find_by_token(&self.db, kind, token)
            .await?
            .ok_or(AppError::TokenNotFound)?;
        if stored.is_expired(Utc::now()) {
            return Err(AppError::TokenExpired);
        }
        Ok(stored)
    }

    async fn send_required(&self, message: MailMessage) -> Result<()> {
        self.mailer.send(&message).await.map_err(|e| {
            error!(subject = %message.subject, "[MAIL] Delivery failed: {}", e);
            AppError::Upstream(e.to_string())
        })
    }

    async fn send_best_effort(&self, message: MailMessage) {
        if let Err(e) = self.mailer.send(&message).await {
            warn!(subject = %message.subject, "[MAIL] Best-effort delivery failed: {}", e);
        }
    }

    // endregion: --- Helpers
}
