//! # Backend Service
//!
//! Thin entry point that delegates to lib-web for server setup.

use lib_web::{start_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before the subscriber reads LOG_LEVEL
    dotenvy::dotenv().ok();

    let mut config = ServerConfig::default();
    if let Ok(bind_address) = std::env::var("BIND_ADDRESS") {
        config.bind_address = bind_address;
    }
    if let Ok(origins) = std::env::var("ALLOWED_ORIGINS") {
        config.allowed_origins = origins
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();
    }

    start_server(config).await
}
