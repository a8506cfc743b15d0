//! Worktrack engine entry point.
//!
//! Loads configuration, connects to PostgreSQL, and runs the background
//! reminder scheduler until interrupted.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use worktrack::adapters::email::{NoopMailer, ResendMailer};
use worktrack::adapters::postgres::{
    PostgresNotificationStore, PostgresOrgDirectory, PostgresWorkCycleRepository,
    PostgresWorkItemRepository,
};
use worktrack::adapters::scheduler::{ReminderScheduler, ReminderSchedulerConfig};
use worktrack::application::notify::ReminderSweep;
use worktrack::config::AppConfig;
use worktrack::ports::{Mailer, SystemClock};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load()?;
    config.validate()?;

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        info!("running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;
    }

    let mailer: Arc<dyn Mailer> = if config.email.enabled {
        Arc::new(ResendMailer::new(
            config.email.resend_api_key.clone(),
            config.email.from_header(),
        )?)
    } else {
        Arc::new(NoopMailer)
    };

    let sweep = Arc::new(ReminderSweep::new(
        Arc::new(PostgresWorkCycleRepository::new(pool.clone())),
        Arc::new(PostgresWorkItemRepository::new(pool.clone())),
        Arc::new(PostgresNotificationStore::new(pool.clone())),
        Arc::new(PostgresOrgDirectory::new(pool.clone())),
        mailer,
        Arc::new(SystemClock),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let scheduler_handle = if config.scheduler.enabled {
        let scheduler = ReminderScheduler::with_config(
            sweep,
            ReminderSchedulerConfig {
                sweep_interval: config.scheduler.sweep_interval(),
            },
        );
        Some(tokio::spawn(async move {
            scheduler.run(shutdown_rx).await;
        }))
    } else {
        info!("reminder scheduler disabled");
        None
    };

    info!("worktrack engine started");
    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");

    if shutdown_tx.send(true).is_err() {
        error!("scheduler already gone");
    }
    if let Some(handle) = scheduler_handle {
        handle.await?;
    }

    pool.close().await;
    Ok(())
}
