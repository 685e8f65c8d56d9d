//! Database migration management commands.

use clap::{Args, Subcommand};

use drive_core::config::{AppConfig, DatabaseBackend};
use drive_core::error::AppError;
use drive_database::DatabasePool;
use drive_database::migration::run_migrations;

use crate::output;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config: &AppConfig) -> Result<(), AppError> {
    if config.database.backend != DatabaseBackend::Postgres {
        output::print_warning("The in-memory backend has no schema to migrate.");
        return Ok(());
    }

    match &args.command {
        MigrateCommand::Run => {
            println!("Running database migrations...");
            let pool = DatabasePool::connect(&config.database).await?;
            run_migrations(pool.pool()).await?;
            pool.close().await;
            output::print_success("All migrations applied successfully.");
        }
    }

    Ok(())
}
