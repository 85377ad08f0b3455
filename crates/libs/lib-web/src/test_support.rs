//! Shared fixtures for service and handler tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use lib_auth::{encode_jwt, hash_password};
use lib_core::model::store::models::{Account, AccountForCreate, AccountForUpdate, Role};
use lib_core::model::store::AccountRepository;
use lib_core::{create_memory_pool, Config, DbPool, MailConfig};

use crate::mail::{MailError, MailMessage, Mailer};
use crate::server::AppState;
use crate::storage::{ObjectStore, StorageError};

pub async fn setup_test_db() -> DbPool {
    create_memory_pool().await.expect("Failed to create test database")
}

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test-secret-key-must-be-at-least-32-characters-long!".to_string(),
        jwt_expiration_hours: 24,
        app_url: "http://app.test".to_string(),
        verification_token_ttl_minutes: 60,
        reset_token_ttl_minutes: 60,
        order_id_max_attempts: 5,
        upload_dir: "unused".to_string(),
        upload_public_url: "memory:/".to_string(),
        mail: MailConfig {
            brevo_api_key: None,
            sender_email: "no-reply@app.test".to_string(),
            sender_name: "Exchange".to_string(),
            timeout_secs: 5,
        },
    }
}

/// Keeps every message it is asked to send.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<MailMessage>>,
    fail: AtomicBool,
}

impl RecordingMailer {
    /// Make every following send fail until reset.
    pub fn fail_next(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn last(&self) -> Option<MailMessage> {
        self.sent.lock().unwrap().last().cloned()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MailError::Transport("recording mailer set to fail".to_string()));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, _content_type: &str, bytes: Vec<u8>) -> Result<String, StorageError> {
        self.objects.lock().unwrap().insert(key.to_string(), bytes);
        Ok(format!("memory://{}", key))
    }
}

pub fn test_state(db: DbPool) -> (AppState, Arc<RecordingMailer>) {
    let mailer = Arc::new(RecordingMailer::default());
    let state = AppState {
        db,
        config: test_config(),
        mailer: mailer.clone(),
        store: Arc::new(MemoryObjectStore::default()),
    };
    (state, mailer)
}

/// Unverified account with role USER, then set to `role`.
pub async fn create_account(db: &DbPool, email: &str, password: &str, role: Role) -> Account {
    let account = AccountRepository::create(
        db,
        AccountForCreate {
            email: email.to_string(),
            password_hash: hash_password(password).expect("Password hashing should succeed in test"),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
        },
    )
    .await
    .expect("Account creation should succeed in test");

    if role == Role::User {
        return account;
    }
    AccountRepository::update(db, account.id, AccountForUpdate::new().role(role))
        .await
        .unwrap()
        .unwrap()
}

pub async fn create_verified_account(db: &DbPool, email: &str, password: &str, role: Role) -> Account {
    let account = create_account(db, email, password, role).await;
    AccountRepository::mark_email_verified(db, email, Utc::now()).await.unwrap();
    AccountRepository::find_by_id(db, account.id).await.unwrap().unwrap()
}

pub fn bearer(config: &Config, account: &Account) -> String {
    let token = encode_jwt(
        account.id,
        &account.email,
        account.role.as_str(),
        &config.jwt_secret,
        config.jwt_expiration_hours,
    )
    .unwrap();
    format!("Bearer {}", token)
}
