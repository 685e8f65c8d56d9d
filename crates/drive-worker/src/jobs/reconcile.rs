//! Quota reconciliation job.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use drive_core::result::AppResult;
use drive_service::{QuotaLedger, ReconcileReport};

/// Recomputes every user's quota usage from their active files.
///
/// Overlapping runs are skipped rather than queued.
#[derive(Debug, Clone)]
pub struct QuotaReconcileJob {
    /// Ledger to reconcile.
    ledger: QuotaLedger,
    /// Held for the duration of a run.
    running: Arc<Mutex<()>>,
}

impl QuotaReconcileJob {
    /// Create a new reconciliation job.
    pub fn new(ledger: QuotaLedger) -> Self {
        Self {
            ledger,
            running: Arc::new(Mutex::new(())),
        }
    }

    /// Run one pass. Returns `None` if a previous pass is still running.
    pub async fn run(&self) -> AppResult<Option<ReconcileReport>> {
        let Ok(_guard) = self.running.try_lock() else {
            warn!("Quota reconciliation already running; skipping this tick");
            return Ok(None);
        };

        info!("Quota reconciliation started");
        let report = self.ledger.recompute_all().await?;

        if !report.failed.is_empty() {
            warn!(
                failed = report.failed.len(),
                "Some quota records could not be recomputed"
            );
        }
        Ok(Some(report))
    }
}
