//! Personal drive server.
//!
//! Loads configuration, opens the configured store backend, starts the quota
//! reconciliation schedule, and serves the HTTP API until interrupted.

use tracing_subscriber::{EnvFilter, fmt};

use drive_api::AppState;
use drive_core::config::AppConfig;
use drive_core::error::AppError;
use drive_database::Stores;
use drive_worker::{CronScheduler, QuotaReconcileJob};

#[tokio::main]
async fn main() {
    let env = std::env::var("DRIVE_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, backend = ?config.database.backend, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    if config.logging.is_json() {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_current_span(false)
            .init();
    } else {
        fmt().pretty().with_env_filter(filter).with_target(true).init();
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    let stores = Stores::open(&config.database).await?;
    let state = AppState::new(config.clone(), stores.clone());

    let scheduler = if config.quota.reconcile_enabled {
        let scheduler = CronScheduler::new().await?;
        let job = QuotaReconcileJob::new(state.drive.ledger().clone());
        scheduler
            .register_quota_reconcile(job, &config.quota.reconcile_cron)
            .await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("Quota reconciliation disabled");
        None
    };

    let served = drive_api::serve(state, shutdown_signal()).await;

    if let Some(scheduler) = scheduler {
        if let Err(e) = scheduler.shutdown().await {
            tracing::warn!(error = %e, "Scheduler did not shut down cleanly");
        }
    }
    stores.close().await;
    tracing::info!("Drive server stopped");

    served
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
