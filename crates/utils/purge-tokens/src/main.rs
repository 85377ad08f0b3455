//! # Purge Tokens Utility
//!
//! Deletes expired email verification and password reset tokens. Live
//! tokens are left alone, so it is safe to run from cron.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --package purge-tokens --bin purge_tokens            # asks first
//! cargo run --package purge-tokens --bin purge_tokens -- --yes   # no prompt
//! ```

use std::io::{self, Write};

use chrono::Utc;
use lib_core::model::store::{TokenKind, TokenRepository};
use lib_core::{create_pool, migrate};
use lib_utils::get_env_or;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let assume_yes = std::env::args().skip(1).any(|a| a == "--yes" || a == "-y");

    println!("============================================");
    println!("  Purge Expired Tokens");
    println!("============================================");
    println!();

    let database_url = get_env_or("DATABASE_URL", "sqlite:data/exchange.db");
    println!("Connecting to {}...", database_url);
    let pool = create_pool(&database_url).await?;
    migrate(&pool).await?;
    println!("Connected successfully.");
    println!();

    if !assume_yes {
        print!("Delete every expired one-time token? (yes/no): ");
        io::stdout().flush()?;

        let mut confirmation = String::new();
        io::stdin().read_line(&mut confirmation)?;
        let confirmation = confirmation.trim().to_lowercase();
        if confirmation != "yes" && confirmation != "y" {
            println!("Operation cancelled.");
            return Ok(());
        }
    }

    let now = Utc::now();
    let verification = TokenRepository::delete_expired(&pool, TokenKind::Verification, now).await?;
    let reset = TokenRepository::delete_expired(&pool, TokenKind::PasswordReset, now).await?;

    println!("Deleted {} verification token(s).", verification);
    println!("Deleted {} password reset token(s).", reset);

    Ok(())
}
