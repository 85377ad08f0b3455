//! # Database Store
//!
//! Database connection pool and repository implementations.

// region: --- Modules
pub mod account_repository;
pub mod admin_wallet_repository;
pub mod kyc_repository;
pub mod models;
pub mod order_repository;
pub mod payment_method_repository;
pub mod token_repository;
pub mod wallet_repository;
// endregion: --- Modules

// region: --- Re-exports
pub use account_repository::AccountRepository;
pub use admin_wallet_repository::AdminWalletRepository;
pub use kyc_repository::KycRepository;
pub use order_repository::OrderRepository;
pub use payment_method_repository::PaymentMethodRepository;
pub use token_repository::{TokenKind, TokenRepository};
pub use wallet_repository::WalletRepository;
// endregion: --- Re-exports

// region: --- Types and Functions
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

/// Type alias for SQLite connection pool.
pub type DbPool = SqlitePool;

/// Migrations embedded at compile time from the workspace `migrations/` folder.
static MIGRATOR: Migrator = sqlx::migrate!("../../../migrations");

/// Create a new SQLite connection pool for `database_url`.
pub async fn create_pool(database_url: &str) -> anyhow::Result<DbPool> {
    let options = database_url
        .parse::<SqliteConnectOptions>()?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Create a migrated in-memory database.
///
/// Every SQLite memory connection is its own database, so the pool is pinned
/// to a single connection that is never recycled.
pub async fn create_memory_pool() -> anyhow::Result<DbPool> {
    let options = "sqlite::memory:"
        .parse::<SqliteConnectOptions>()?
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    migrate(&pool).await?;
    Ok(pool)
}

/// Apply pending migrations.
pub async fn migrate(pool: &DbPool) -> anyhow::Result<()> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

/// Whether a database error is a UNIQUE constraint violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
// endregion: --- Types and Functions
