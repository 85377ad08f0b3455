//! # Server Setup
//!
//! Server initialization, route registration, and HTTP server startup.
//!
//! The entry point builds every collaborator once (pool, configuration,
//! mailer, object store) and hands them to the handlers through
//! [`AppState`]. Services are derived from the state per request via
//! `FromRef`, so handlers only name the service they need.

// region: --- Imports
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{DefaultBodyLimit, FromRef},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post},
    Router,
};
use lib_core::dto::MAX_KYC_DOCUMENTS;
use lib_core::{create_pool, migrate, Config, DbPool};
use tower_http::classify::ServerErrorsFailureClass;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Span};

use crate::handlers;
use crate::mail::{BrevoMailer, LogMailer, Mailer};
use crate::middleware::{log_requests, map_res, resolve_session, stamp_req};
use crate::services::{AccountService, AdminService, KycService, NotificationService, OrderService, WalletService};
use crate::storage::{upload_body_limit, LocalObjectStore, ObjectStore};
// endregion: --- Imports

// region: --- AppState
/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub mailer: Arc<dyn Mailer>,
    pub store: Arc<dyn ObjectStore>,
}

impl FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for AccountService {
    fn from_ref(state: &AppState) -> Self {
        AccountService::new(
            state.db.clone(),
            state.config.clone(),
            state.mailer.clone(),
            state.store.clone(),
        )
    }
}

impl FromRef<AppState> for OrderService {
    fn from_ref(state: &AppState) -> Self {
        OrderService::new(state.db.clone(), &state.config)
    }
}

impl FromRef<AppState> for KycService {
    fn from_ref(state: &AppState) -> Self {
        KycService::new(state.db.clone(), state.store.clone())
    }
}

impl FromRef<AppState> for NotificationService {
    fn from_ref(state: &AppState) -> Self {
        NotificationService::new(state.db.clone())
    }
}

impl FromRef<AppState> for WalletService {
    fn from_ref(state: &AppState) -> Self {
        WalletService::new(state.db.clone())
    }
}

impl FromRef<AppState> for AdminService {
    fn from_ref(state: &AppState) -> Self {
        AdminService::new(state.db.clone())
    }
}
// endregion: --- AppState

// region: --- Server Configuration
/// Server configuration
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:3001")
    pub bind_address: String,
    /// Allowed CORS origins
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3001".to_string(),
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}
// endregion: --- Server Configuration

// region: --- Server Setup
/// Initialize and start the HTTP server
///
/// # Errors
///
/// This function will return an error if:
/// - The tracing subscriber cannot be installed
/// - Configuration loading or validation fails
/// - Database connection or migrations fail
/// - The mail client cannot be built
/// - Server binding fails
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    let log_level = std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase();

    let filter = match log_level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => tracing_subscriber::EnvFilter::new(&log_level),
        _ => tracing_subscriber::EnvFilter::new("info"),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("EXCHANGE BACKEND STARTING");
    info!("Log level: {}", log_level);

    info!("Loading configuration...");
    let app_config = Config::from_env()?;
    app_config.validate()?;

    ensure_sqlite_dir(&app_config.database_url)?;

    info!("Connecting to database...");
    let pool = create_pool(&app_config.database_url).await?;

    info!("Running embedded migrations...");
    migrate(&pool).await?;
    info!("Migrations complete");

    let mailer: Arc<dyn Mailer> = match &app_config.mail.brevo_api_key {
        Some(key) => {
            info!("Mail delivery via Brevo as {}", app_config.mail.sender_email);
            Arc::new(BrevoMailer::new(key.clone(), &app_config.mail)?)
        }
        None => {
            warn!("BREVO_API_KEY not set, emails will only be logged");
            Arc::new(LogMailer)
        }
    };

    tokio::fs::create_dir_all(&app_config.upload_dir).await?;
    let store: Arc<dyn ObjectStore> = Arc::new(LocalObjectStore::new(
        &app_config.upload_dir,
        &app_config.upload_public_url,
    ));
    info!("Uploads stored under {}", app_config.upload_dir);

    let state = AppState {
        db: pool,
        config: app_config,
        mailer,
        store,
    };

    let app = create_router(state, config.allowed_origins);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("SERVER READY: http://{}", config.bind_address);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Create the directory holding a file-backed SQLite database.
fn ensure_sqlite_dir(database_url: &str) -> anyhow::Result<()> {
    let Some(path) = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
    else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path.starts_with(":memory:") {
        return Ok(());
    }

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
            info!("Created database directory: {:?}", parent);
        }
    }
    Ok(())
}

/// All `/api` routes with session resolution, without the outer
/// logging/trace/CORS layers.
pub fn api_router(state: AppState) -> Router {
    use handlers::{account, admin, auth, kyc, orders, wallets};

    Router::new()
        // Account lifecycle
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/verify-email", post(auth::verify_email))
        .route("/api/auth/resend-verification", post(auth::resend_verification))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/forgot-password", post(auth::forgot_password))
        .route("/api/auth/reset-password", post(auth::reset_password))
        .route("/api/auth/change-password", post(auth::change_password))
        .route("/api/account/profile", get(account::get_profile).put(account::update_profile))
        .route(
            "/api/account/profile/image",
            post(account::upload_profile_image).layer(DefaultBodyLimit::max(upload_body_limit(1))),
        )
        // Orders and KYC
        .route("/api/orders", get(orders::list_orders).post(orders::place_order))
        .route("/api/orders/{id}", get(orders::get_order))
        .route(
            "/api/kyc",
            get(kyc::get_status).post(kyc::submit).layer(DefaultBodyLimit::max(upload_body_limit(MAX_KYC_DOCUMENTS))),
        )
        // Payout destinations
        .route("/api/wallets", get(wallets::list_wallets).post(wallets::save_wallet))
        .route("/api/wallets/{id}", axum::routing::delete(wallets::delete_wallet))
        .route(
            "/api/payment-methods",
            get(wallets::list_payment_methods).post(wallets::create_payment_method),
        )
        .route(
            "/api/payment-methods/{id}",
            axum::routing::put(wallets::update_payment_method).delete(wallets::delete_payment_method),
        )
        // Back office
        .route("/api/admin/overview", get(admin::overview))
        .route("/api/admin/accounts", get(admin::list_accounts))
        .route("/api/admin/accounts/{id}", patch(admin::update_account))
        .route("/api/admin/orders", get(admin::list_orders))
        .route("/api/admin/orders/{id}/status", post(admin::update_order_status))
        .route("/api/admin/kyc", get(admin::list_kyc))
        .route("/api/admin/kyc/{id}/review", post(admin::review_kyc))
        .route("/api/admin/wallets", get(admin::list_admin_wallets).post(admin::save_admin_wallet))
        .route("/api/admin/wallets/{id}/active", post(admin::set_admin_wallet_active))
        .route("/api/admin/notifications", get(admin::check_new))
        .layer(from_fn_with_state(state.clone(), resolve_session))
        .with_state(state)
}

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState, allowed_origins: Vec<String>) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    info!("[ROUTE SETUP] Registering HTTP routes...");
    api_router(state)
        .route("/health", get(|| async { "OK" }))
        .fallback(|| async { (StatusCode::NOT_FOUND, "Route not found") })
        .layer(from_fn(map_res))
        .layer(from_fn(log_requests))
        // Request stamping runs first so the layers above can read the id
        .layer(from_fn(stamp_req))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    let request_id = request
                        .headers()
                        .get(crate::middleware::mw_req_stamp::REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-")
                        .to_string();
                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        uri = %request.uri().path(),
                    )
                })
                .on_failure(|error: ServerErrorsFailureClass, latency: Duration, _span: &Span| {
                    tracing::error!(
                        error = ?error,
                        latency_ms = latency.as_millis(),
                        "[HTTP FAILURE] {:?} after {}ms",
                        error,
                        latency.as_millis()
                    );
                }),
        )
        .layer(cors)
}
// endregion: --- Server Setup
