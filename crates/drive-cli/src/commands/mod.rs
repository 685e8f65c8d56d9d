//! CLI command definitions and dispatch.

pub mod folder;
pub mod migrate;
pub mod quota;

use clap::{Parser, Subcommand};

use drive_core::config::AppConfig;
use drive_core::error::AppError;
use drive_core::types::{TenantId, UserId};
use drive_database::Stores;
use drive_service::{DriveFacade, RequestContext};

use crate::output::OutputFormat;

/// Personal drive administration
#[derive(Debug, Parser)]
#[command(name = "drive-cli", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment; loads `config/{env}.toml` over the defaults
    #[arg(short, long, env = "DRIVE_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Quota inspection and maintenance
    Quota(quota::QuotaArgs),
    /// Folder inspection
    Folder(folder::FolderArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load(&self.env)?;
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &config).await,
            Commands::Quota(args) => quota::execute(args, &config, self.format).await,
            Commands::Folder(args) => folder::execute(args, &config, self.format).await,
        }
    }
}

/// Identity flags for commands that act on one user's drive.
#[derive(Debug, Clone, clap::Args)]
pub struct UserArgs {
    /// User ID
    #[arg(short, long)]
    pub user: UserId,
    /// Tenant ID of the user
    #[arg(short, long)]
    pub tenant: TenantId,
}

impl UserArgs {
    /// Request context acting as this user.
    pub fn context(&self) -> RequestContext {
        RequestContext::new(self.user, self.tenant)
    }
}

/// Helper: open the configured stores and build the drive façade.
pub async fn open_drive(config: &AppConfig) -> Result<(Stores, DriveFacade), AppError> {
    let stores = Stores::open(&config.database).await?;
    let drive = DriveFacade::from_stores(&stores, &config.quota);
    Ok((stores, drive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::quota::QuotaCommand;

    const USER: &str = "6a1f4c52-93b7-4f0e-9d55-2f8c1e7b0a11";
    const TENANT: &str = "0b3d9e27-5c84-4a6f-8e12-7f4a2c9d6e30";

    fn quota(args: &[&str]) -> Result<QuotaCommand, clap::Error> {
        let argv = ["drive-cli", "quota"].iter().chain(args).copied();
        match Cli::try_parse_from(argv)?.command {
            Commands::Quota(args) => Ok(args.command),
            other => panic!("expected quota command, got {other:?}"),
        }
    }

    #[test]
    fn test_recompute_needs_user_or_all() {
        let err = quota(&["recompute"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_recompute_rejects_user_with_all() {
        let err = quota(&["recompute", USER, "--all"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_recompute_single_user_or_all() {
        match quota(&["recompute", USER]).unwrap() {
            QuotaCommand::Recompute { user, all } => {
                assert_eq!(user.map(|u| u.to_string()).as_deref(), Some(USER));
                assert!(!all);
            }
            other => panic!("unexpected {other:?}"),
        }
        match quota(&["recompute", "--all"]).unwrap() {
            QuotaCommand::Recompute { user, all } => {
                assert!(user.is_none());
                assert!(all);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_recompute_rejects_malformed_user() {
        let err = quota(&["recompute", "not-a-uuid"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_report_filters_are_exclusive() {
        let err = quota(&["report", "--above", "80", "--exceeding"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);

        match quota(&["report", "--above", "80"]).unwrap() {
            QuotaCommand::Report { above, exceeding } => {
                assert_eq!(above, Some(80.0));
                assert!(!exceeding);
            }
            other => panic!("unexpected {other:?}"),
        }
        match quota(&["report", "--exceeding"]).unwrap() {
            QuotaCommand::Report { above, exceeding } => {
                assert!(above.is_none());
                assert!(exceeding);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_set_max_takes_identity_flags() {
        match quota(&["set-max", "-u", USER, "-t", TENANT, "--bytes", "1024", "--yes"]).unwrap() {
            QuotaCommand::SetMax { who, bytes, yes } => {
                assert_eq!(who.user.to_string(), USER);
                assert_eq!(who.tenant.to_string(), TENANT);
                assert_eq!(bytes, 1024);
                assert!(yes);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_format_flag() {
        let cli = Cli::try_parse_from(["drive-cli", "-f", "json", "quota", "recompute", "--all"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
    }
}
