//! Taskgate - multi-tenant task management API

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskgate::{auth::TokenService, config::Args, db::Store, server, server::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("taskgate={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("==================================");
    info!("  Taskgate - task management API");
    info!("==================================");
    info!("Listen: {}", args.listen);
    info!("Database: {}", args.database_url);
    info!("Token TTL: {} minutes", args.access_token_expire_minutes);
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!("==================================");

    let store = match Store::connect(&args.database_url).await {
        Ok(store) => store,
        Err(e) => {
            error!("Database connection failed: {}", e);
            std::process::exit(1);
        }
    };

    let auth_config = match args.auth_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    let tokens = TokenService::new(&auth_config);

    let state = Arc::new(AppState {
        args,
        store,
        tokens,
    });

    server::run(state).await?;
    Ok(())
}
