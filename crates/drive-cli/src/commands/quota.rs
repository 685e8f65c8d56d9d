//! Quota inspection and maintenance commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use drive_core::config::AppConfig;
use drive_core::error::AppError;
use drive_core::types::UserId;
use drive_entity::file::format_size;
use drive_entity::quota::{QuotaRecord, QuotaSnapshot};

use super::UserArgs;
use crate::output::{self, OutputFormat};

/// Arguments for quota commands
#[derive(Debug, Args)]
pub struct QuotaArgs {
    /// Quota subcommand
    #[command(subcommand)]
    pub command: QuotaCommand,
}

/// Quota subcommands
#[derive(Debug, Subcommand)]
pub enum QuotaCommand {
    /// Show a user's quota record
    Show {
        /// User ID
        user: UserId,
    },
    /// Recompute usage from active files
    Recompute {
        /// User to recompute
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        user: Option<UserId>,
        /// Recompute every user with a quota record
        #[arg(long)]
        all: bool,
    },
    /// Change a user's capacity
    SetMax {
        /// Target user
        #[command(flatten)]
        who: UserArgs,
        /// New capacity in bytes
        #[arg(long)]
        bytes: i64,
        /// Skip confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// List users by usage
    Report {
        /// Users at or above this usage percentage
        #[arg(long, conflicts_with = "exceeding")]
        above: Option<f64>,
        /// Users whose usage exceeds their capacity
        #[arg(long)]
        exceeding: bool,
    },
}

/// Quota display row
#[derive(Debug, Serialize, Tabled)]
struct QuotaRow {
    /// User ID
    user_id: String,
    /// Used
    used: String,
    /// Capacity
    max: String,
    /// Usage percentage
    usage: String,
}

impl From<&QuotaRecord> for QuotaRow {
    fn from(record: &QuotaRecord) -> Self {
        let snapshot = QuotaSnapshot::from(record);
        Self {
            user_id: record.user_id.to_string(),
            used: format_size(record.used_bytes),
            max: format_size(record.max_bytes),
            usage: format!("{:.1}%", snapshot.usage_percentage),
        }
    }
}

/// Drift display row
#[derive(Debug, Serialize, Tabled)]
struct DriftRow {
    /// User ID
    user_id: String,
    /// Recorded usage before the correction
    recorded: i64,
    /// Usage recomputed from files
    actual: i64,
    /// Difference
    drift: i64,
}

/// Execute quota commands
pub async fn execute(
    args: &QuotaArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let (stores, drive) = super::open_drive(config).await?;
    let ledger = drive.ledger();

    match &args.command {
        QuotaCommand::Show { user } => match ledger.find(*user).await? {
            Some(record) => match format {
                OutputFormat::Json => output::print_json(&record),
                OutputFormat::Table => {
                    let snapshot = QuotaSnapshot::from(&record);
                    output::print_kv("User", &record.user_id.to_string());
                    output::print_kv("Tenant", &record.tenant_id.to_string());
                    output::print_kv("Used", &format_size(record.used_bytes));
                    output::print_kv("Capacity", &format_size(record.max_bytes));
                    output::print_kv("Available", &format_size(snapshot.available_bytes));
                    output::print_kv("Usage", &format!("{:.1}%", snapshot.usage_percentage));
                    output::print_kv("Updated", &record.updated_at.to_rfc3339());
                }
            },
            None => output::print_warning(&format!("No quota record for user {user}")),
        },
        QuotaCommand::Recompute { user, all } => {
            if *all {
                let report = ledger.recompute_all().await?;
                let rows: Vec<DriftRow> = report
                    .corrected
                    .iter()
                    .map(|d| DriftRow {
                        user_id: d.user_id.to_string(),
                        recorded: d.recorded_bytes,
                        actual: d.actual_bytes,
                        drift: d.drift(),
                    })
                    .collect();
                output::print_list(&rows, format);
                output::print_success(&format!(
                    "Checked {} records: {} corrected, {} failed",
                    report.checked,
                    report.corrected.len(),
                    report.failed.len()
                ));
            } else if let Some(user) = user {
                let drift = ledger.recompute(*user).await?;
                match drift.to_error() {
                    Some(err) => output::print_warning(&err.message),
                    None => output::print_success(&format!(
                        "Usage for {user} verified at {}",
                        format_size(drift.actual_bytes)
                    )),
                }
            }
        }
        QuotaCommand::SetMax { who, bytes, yes } => {
            if !yes {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!(
                        "Set capacity of {} to {}?",
                        who.user,
                        format_size(*bytes)
                    ))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;

                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            let record = ledger.set_max(&who.context(), *bytes).await?;
            output::print_success(&format!(
                "Capacity of {} set to {} ({} used)",
                record.user_id,
                format_size(record.max_bytes),
                format_size(record.used_bytes)
            ));
        }
        QuotaCommand::Report { above, exceeding } => {
            let records = match above {
                Some(percentage) => ledger.users_above(*percentage).await?,
                None if *exceeding => ledger.users_exceeding().await?,
                None => ledger.users_above(0.0).await?,
            };
            let rows: Vec<QuotaRow> = records.iter().map(QuotaRow::from).collect();
            output::print_list(&rows, format);
        }
    }

    stores.close().await;
    Ok(())
}
