//! Per-user quota ledger.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use drive_core::config::QuotaConfig;
use drive_core::error::AppError;
use drive_core::result::AppResult;
use drive_core::types::UserId;
use drive_database::{Charge, FileStore, QuotaStore};
use drive_entity::file::format_size;
use drive_entity::quota::{CreateQuota, QuotaRecord, QuotaSnapshot};

use crate::context::RequestContext;

/// Outcome of recomputing one user's usage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaDrift {
    /// The user whose usage was recomputed.
    pub user_id: UserId,
    /// Running total before the correction.
    pub recorded_bytes: i64,
    /// Sum of the user's active files.
    pub actual_bytes: i64,
}

impl QuotaDrift {
    /// `recorded - actual`; positive means the ledger over-counted.
    pub fn drift(&self) -> i64 {
        self.recorded_bytes - self.actual_bytes
    }

    /// Whether the running total was wrong.
    pub fn has_drift(&self) -> bool {
        self.drift() != 0
    }

    /// The drift as an `Inconsistent` error, for tooling that treats any
    /// correction as a failure.
    pub fn to_error(&self) -> Option<AppError> {
        self.has_drift().then(|| {
            AppError::inconsistent(format!(
                "Quota for user {} recorded {} bytes but active files total {} bytes",
                self.user_id, self.recorded_bytes, self.actual_bytes
            ))
        })
    }
}

/// Summary of a reconciliation pass over every quota record.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    /// Records examined.
    pub checked: usize,
    /// Records whose usage was corrected.
    pub corrected: Vec<QuotaDrift>,
    /// Users whose recompute failed.
    pub failed: Vec<UserId>,
}

/// Owns the per-user running total of bytes used.
///
/// Every change to `used_bytes` goes through an atomic store primitive:
/// [`reserve`](Self::reserve) is a conditional increment and
/// [`apply_delta`](Self::apply_delta) an unconditional, zero-floored one.
/// [`recompute`](Self::recompute) is the correction path when the running
/// total drifts from the files it describes.
#[derive(Clone)]
pub struct QuotaLedger {
    /// Quota persistence.
    quotas: Arc<dyn QuotaStore>,
    /// File persistence, used to seed and recompute usage.
    files: Arc<dyn FileStore>,
    /// Capacity granted to newly created records.
    default_max_bytes: i64,
}

impl std::fmt::Debug for QuotaLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuotaLedger")
            .field("default_max_bytes", &self.default_max_bytes)
            .finish_non_exhaustive()
    }
}

impl QuotaLedger {
    /// Creates a new quota ledger.
    pub fn new(
        quotas: Arc<dyn QuotaStore>,
        files: Arc<dyn FileStore>,
        config: &QuotaConfig,
    ) -> Self {
        Self {
            quotas,
            files,
            default_max_bytes: config.default_max_bytes,
        }
    }

    /// Returns the user's record, creating it on first access.
    ///
    /// A new record starts with usage equal to the user's current active
    /// files rather than zero.
    pub async fn get_or_create(&self, ctx: &RequestContext) -> AppResult<QuotaRecord> {
        if let Some(record) = self.quotas.find(ctx.user_id).await? {
            return Ok(record);
        }

        let used_bytes = self.files.active_bytes(ctx.user_id).await?;
        let record = self
            .quotas
            .insert_if_absent(&CreateQuota {
                user_id: ctx.user_id,
                tenant_id: ctx.tenant_id,
                max_bytes: self.default_max_bytes,
                used_bytes,
            })
            .await?;

        info!(
            user_id = %ctx.user_id,
            tenant_id = %ctx.tenant_id,
            max_bytes = record.max_bytes,
            used_bytes = record.used_bytes,
            "Quota record initialized"
        );
        Ok(record)
    }

    /// Derived view of the user's quota.
    pub async fn snapshot(&self, ctx: &RequestContext) -> AppResult<QuotaSnapshot> {
        let record = self.get_or_create(ctx).await?;
        Ok(QuotaSnapshot::from(&record))
    }

    /// Whether `required_bytes` more would fit: `max - used >= required`.
    pub async fn has_available(&self, ctx: &RequestContext, required_bytes: i64) -> AppResult<bool> {
        let record = self.get_or_create(ctx).await?;
        Ok(record.has_available(required_bytes))
    }

    /// Charge `bytes` against the user's capacity, or fail `Conflict`
    /// without changing usage.
    ///
    /// The capacity check and the increment are one atomic store operation,
    /// so concurrent reservations can never jointly exceed the capacity.
    pub async fn reserve(&self, ctx: &RequestContext, bytes: i64) -> AppResult<QuotaRecord> {
        if bytes < 0 {
            return Err(AppError::invalid_input("Reserved size cannot be negative"));
        }

        let mut charge = self.quotas.try_charge(ctx.user_id, bytes).await?;
        if charge == Charge::NoRecord {
            self.get_or_create(ctx).await?;
            charge = self.quotas.try_charge(ctx.user_id, bytes).await?;
        }

        match charge {
            Charge::Applied(record) => {
                debug!(
                    user_id = %ctx.user_id,
                    bytes,
                    used_bytes = record.used_bytes,
                    "Quota reserved"
                );
                Ok(record)
            }
            Charge::Insufficient(record) => {
                info!(
                    user_id = %ctx.user_id,
                    requested = bytes,
                    available = record.available_bytes(),
                    "Quota reservation rejected"
                );
                Err(AppError::conflict(format!(
                    "Insufficient storage space: {} requested, {} available",
                    format_size(bytes),
                    format_size(record.available_bytes())
                )))
            }
            Charge::NoRecord => Err(AppError::inconsistent(format!(
                "Quota record for user {} disappeared after creation",
                ctx.user_id
            ))),
        }
    }

    /// Atomically set `used = max(0, used + delta)`.
    ///
    /// The zero floor masks double credits; `recompute` is what repairs the
    /// running total afterwards.
    pub async fn apply_delta(&self, ctx: &RequestContext, delta: i64) -> AppResult<QuotaRecord> {
        let record = match self.quotas.apply_delta(ctx.user_id, delta).await? {
            Some(record) => record,
            None => {
                self.get_or_create(ctx).await?;
                self.quotas
                    .apply_delta(ctx.user_id, delta)
                    .await?
                    .ok_or_else(|| {
                        AppError::inconsistent(format!(
                            "Quota record for user {} disappeared after creation",
                            ctx.user_id
                        ))
                    })?
            }
        };

        debug!(
            user_id = %ctx.user_id,
            delta,
            used_bytes = record.used_bytes,
            "Quota delta applied"
        );
        Ok(record)
    }

    /// Recalculate a user's usage from their active files.
    ///
    /// Fails `NotFound` if the user has no quota record.
    pub async fn recompute(&self, user_id: UserId) -> AppResult<QuotaDrift> {
        let outcome = self
            .quotas
            .recompute(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("No quota record for user {user_id}")))?;

        let drift = QuotaDrift {
            user_id,
            recorded_bytes: outcome.previous_used,
            actual_bytes: outcome.record.used_bytes,
        };

        if drift.has_drift() {
            warn!(
                user_id = %user_id,
                recorded_bytes = drift.recorded_bytes,
                actual_bytes = drift.actual_bytes,
                drift = drift.drift(),
                "Quota drift corrected"
            );
        } else {
            debug!(user_id = %user_id, used_bytes = drift.actual_bytes, "Quota verified");
        }
        Ok(drift)
    }

    /// Recompute every quota record.
    ///
    /// A failure for one user is logged and recorded in the report; the
    /// pass continues with the next user.
    pub async fn recompute_all(&self) -> AppResult<ReconcileReport> {
        let records = self.quotas.list_all().await?;
        let mut report = ReconcileReport {
            checked: records.len(),
            ..ReconcileReport::default()
        };

        for record in records {
            match self.recompute(record.user_id).await {
                Ok(drift) if drift.has_drift() => report.corrected.push(drift),
                Ok(_) => {}
                Err(e) => {
                    warn!(user_id = %record.user_id, error = %e, "Quota recompute failed");
                    report.failed.push(record.user_id);
                }
            }
        }

        info!(
            checked = report.checked,
            corrected = report.corrected.len(),
            failed = report.failed.len(),
            "Quota reconciliation finished"
        );
        Ok(report)
    }

    /// Change a user's capacity, creating their record if needed.
    pub async fn set_max(&self, ctx: &RequestContext, max_bytes: i64) -> AppResult<QuotaRecord> {
        if max_bytes < 0 {
            return Err(AppError::invalid_input("Maximum storage cannot be negative"));
        }
        self.get_or_create(ctx).await?;

        let record = self
            .quotas
            .set_max(ctx.user_id, max_bytes)
            .await?
            .ok_or_else(|| AppError::not_found(format!("No quota record for user {}", ctx.user_id)))?;

        info!(user_id = %ctx.user_id, max_bytes, "Quota capacity updated");
        Ok(record)
    }

    /// Existing record for a user, without creating one.
    pub async fn find(&self, user_id: UserId) -> AppResult<Option<QuotaRecord>> {
        self.quotas.find(user_id).await
    }

    /// Records whose usage exceeds their capacity.
    pub async fn users_exceeding(&self) -> AppResult<Vec<QuotaRecord>> {
        self.quotas.list_exceeding().await
    }

    /// Records at or above `percentage` percent usage.
    pub async fn users_above(&self, percentage: f64) -> AppResult<Vec<QuotaRecord>> {
        if !percentage.is_finite() || percentage < 0.0 {
            return Err(AppError::invalid_input(
                "Usage percentage must be a non-negative number",
            ));
        }
        self.quotas.list_usage_above(percentage).await
    }
}
