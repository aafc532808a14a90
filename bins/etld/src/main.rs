//! Atelier warehouse ETL daemon.
//!
//! Boots the pipeline, performs one full run so a fresh deployment has a
//! populated warehouse immediately, then hands off to the scheduler.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use atelier_db::connect;
use atelier_etl::{EtlScheduler, WarehouseEtl};
use atelier_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "atelier=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Connect to database
    let db = connect(&config.database.url).await?;
    info!("Connected to database");

    let etl = Arc::new(WarehouseEtl::new(db, config.etl.clone()));

    // Bootstrap run so the warehouse is populated before the first tick
    let report = etl.run_daily().await;
    info!(run_id = %report.run_id, status = ?report.status, "bootstrap run finished");

    // Hand off to the cadence loops
    let scheduler = EtlScheduler::new(etl, config.etl);
    let (daily, hourly) = scheduler.spawn();
    tokio::try_join!(daily, hourly)?;

    Ok(())
}
