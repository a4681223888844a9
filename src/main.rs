//! ClubGate Telegram Bot
//!
//! Main application entry point

use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use ClubGate::{
    config::Settings,
    database::{connection::{create_pool, run_migrations, PoolOptions}, Database, DatabaseService, MemoryDatabase},
    telegram::{BotRuntime, TeloxideApi},
    utils::logging,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("failed to load settings")?;
    settings.validate()?;

    // Initialize logging
    let logging_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", ClubGate::info());

    let token_ttl = chrono::Duration::hours(settings.site.token_ttl_hours);
    let db: Arc<dyn Database> = if settings.database.is_in_memory() {
        info!("Using in-memory store, data is lost on restart");
        Arc::new(MemoryDatabase::new(token_ttl))
    } else {
        info!("Connecting to database...");
        let pool = create_pool(&settings.database, &PoolOptions::default()).await?;
        run_migrations(&pool).await?;

        if settings.database.only_migrate {
            info!("Migrations applied, exiting");
            return Ok(());
        }

        Arc::new(DatabaseService::new(pool, token_ttl))
    };

    let api = Arc::new(TeloxideApi::from_config(&settings.bot)?);
    let cancel = CancellationToken::new();
    let runtime = BotRuntime::start(api, db, &settings, cancel)?;

    if settings.logging.admin_alerts {
        logging_guard.attach_alerts(runtime.notifier());
    }

    info!("ClubGate bot is ready!");

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }

    runtime.shutdown(settings.shutdown_grace()).await;
    info!("ClubGate bot stopped");
    Ok(())
}
