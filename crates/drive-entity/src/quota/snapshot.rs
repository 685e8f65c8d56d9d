//! Read-only quota view.

use serde::{Deserialize, Serialize};

use super::model::QuotaRecord;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Derived quota figures returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaSnapshot {
    /// Capacity in bytes.
    pub max_bytes: i64,
    /// Bytes charged.
    pub used_bytes: i64,
    /// `used_bytes` in mebibytes.
    #[serde(rename = "usedMB")]
    pub used_mb: f64,
    /// `max_bytes` in mebibytes.
    #[serde(rename = "maxMB")]
    pub max_mb: f64,
    /// `used * 100 / max`, or 0 when the capacity is 0.
    pub usage_percentage: f64,
    /// `max(0, max - used)`.
    pub available_bytes: i64,
    /// `available_bytes` in mebibytes.
    #[serde(rename = "availableMB")]
    pub available_mb: f64,
}

impl QuotaSnapshot {
    /// Compute the view from raw capacity and usage.
    pub fn new(max_bytes: i64, used_bytes: i64) -> Self {
        let available_bytes = (max_bytes - used_bytes).max(0);
        let usage_percentage = if max_bytes > 0 {
            used_bytes as f64 * 100.0 / max_bytes as f64
        } else {
            0.0
        };

        Self {
            max_bytes,
            used_bytes,
            used_mb: used_bytes as f64 / BYTES_PER_MB,
            max_mb: max_bytes as f64 / BYTES_PER_MB,
            usage_percentage,
            available_bytes,
            available_mb: available_bytes as f64 / BYTES_PER_MB,
        }
    }
}

impl From<&QuotaRecord> for QuotaSnapshot {
    fn from(record: &QuotaRecord) -> Self {
        Self::new(record.max_bytes, record.used_bytes)
    }
}
