//! Storage quota policy.

use serde::{Deserialize, Serialize};

/// Quota defaults and reconciliation schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Maximum bytes granted to a user the first time a quota record is
    /// created for them.
    #[serde(default = "default_max_bytes")]
    pub default_max_bytes: i64,
    /// Whether the background reconciliation job runs.
    #[serde(default = "default_true")]
    pub reconcile_enabled: bool,
    /// Six-field cron expression (with seconds) for the reconciliation job.
    #[serde(default = "default_reconcile_cron")]
    pub reconcile_cron: String,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            default_max_bytes: default_max_bytes(),
            reconcile_enabled: default_true(),
            reconcile_cron: default_reconcile_cron(),
        }
    }
}

/// 2 GiB.
fn default_max_bytes() -> i64 {
    2_147_483_648
}

fn default_true() -> bool {
    true
}

fn default_reconcile_cron() -> String {
    "0 30 3 * * *".to_string()
}
