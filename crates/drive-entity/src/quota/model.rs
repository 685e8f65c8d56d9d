//! Quota record model.

use chrono::{DateTime, Utc};
use drive_core::types::{QuotaId, TenantId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Per-user storage ledger row.
///
/// `used_bytes` is a running total maintained by deltas. It should equal
/// the sum of the user's active file sizes and is corrected by recompute
/// when it drifts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct QuotaRecord {
    /// Unique record identifier.
    pub id: QuotaId,
    /// The owning user. At most one record exists per user.
    pub user_id: UserId,
    /// Tenant of the owning user, kept for reporting.
    pub tenant_id: TenantId,
    /// Capacity in bytes.
    pub max_bytes: i64,
    /// Bytes currently charged. Never negative.
    pub used_bytes: i64,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last charged, credited, or recomputed.
    pub updated_at: DateTime<Utc>,
}

impl QuotaRecord {
    /// Bytes still available, floored at zero.
    pub fn available_bytes(&self) -> i64 {
        (self.max_bytes - self.used_bytes).max(0)
    }

    /// Whether `required` more bytes fit under the capacity.
    pub fn has_available(&self, required: i64) -> bool {
        self.max_bytes - self.used_bytes >= required
    }

    /// Whether usage is above capacity (possible after a capacity cut).
    pub fn is_exceeded(&self) -> bool {
        self.used_bytes > self.max_bytes
    }
}

/// Data required to create a quota record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateQuota {
    /// The owning user.
    pub user_id: UserId,
    /// Tenant of the owning user.
    pub tenant_id: TenantId,
    /// Initial capacity.
    pub max_bytes: i64,
    /// Initial usage, normally the sum of the user's active files.
    pub used_bytes: i64,
}
