//! Quota repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use drive_core::result::AppResult;
use drive_core::types::{QuotaId, UserId};
use drive_entity::quota::{CreateQuota, QuotaRecord};

use super::db_error;
use crate::store::{Charge, QuotaStore, Recomputed};

/// Repository for the `drive_quotas` table.
#[derive(Debug, Clone)]
pub struct QuotaRepository {
    pool: PgPool,
}

impl QuotaRepository {
    /// Create a new quota repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuotaStore for QuotaRepository {
    async fn find(&self, user_id: UserId) -> AppResult<Option<QuotaRecord>> {
        sqlx::query_as::<_, QuotaRecord>("SELECT * FROM drive_quotas WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find quota"))
    }

    async fn insert_if_absent(&self, data: &CreateQuota) -> AppResult<QuotaRecord> {
        let inserted = sqlx::query_as::<_, QuotaRecord>(
            "INSERT INTO drive_quotas (id, user_id, tenant_id, max_bytes, used_bytes) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (user_id) DO NOTHING RETURNING *",
        )
        .bind(QuotaId::new())
        .bind(data.user_id)
        .bind(data.tenant_id)
        .bind(data.max_bytes)
        .bind(data.used_bytes.max(0))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to create quota"))?;

        match inserted {
            Some(record) => Ok(record),
            // Lost the race to a concurrent creator; theirs is authoritative.
            None => sqlx::query_as::<_, QuotaRecord>(
                "SELECT * FROM drive_quotas WHERE user_id = $1",
            )
            .bind(data.user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to load quota")),
        }
    }

    async fn try_charge(&self, user_id: UserId, bytes: i64) -> AppResult<Charge> {
        let charged = sqlx::query_as::<_, QuotaRecord>(
            "UPDATE drive_quotas \
                SET used_bytes = used_bytes + $2, updated_at = NOW() \
              WHERE user_id = $1 AND max_bytes - used_bytes >= $2 RETURNING *",
        )
        .bind(user_id)
        .bind(bytes)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to charge quota"))?;

        if let Some(record) = charged {
            return Ok(Charge::Applied(record));
        }
        Ok(match self.find(user_id).await? {
            Some(record) => Charge::Insufficient(record),
            None => Charge::NoRecord,
        })
    }

    async fn apply_delta(&self, user_id: UserId, delta: i64) -> AppResult<Option<QuotaRecord>> {
        sqlx::query_as::<_, QuotaRecord>(
            "UPDATE drive_quotas \
                SET used_bytes = GREATEST(0, used_bytes + $2), updated_at = NOW() \
              WHERE user_id = $1 RETURNING *",
        )
        .bind(user_id)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to apply quota delta"))
    }

    async fn recompute(&self, user_id: UserId) -> AppResult<Option<Recomputed>> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        let previous_used = sqlx::query_scalar::<_, i64>(
            "SELECT used_bytes FROM drive_quotas WHERE user_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to lock quota"))?;

        let Some(previous_used) = previous_used else {
            return Ok(None);
        };

        let record = sqlx::query_as::<_, QuotaRecord>(
            "UPDATE drive_quotas SET \
                used_bytes = ( \
                    SELECT COALESCE(SUM(size_bytes), 0)::BIGINT FROM drive_files \
                     WHERE user_id = $1 AND state = 'active' \
                ), \
                updated_at = NOW() \
              WHERE user_id = $1 RETURNING *",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to recompute quota usage"))?;

        tx.commit().await.map_err(db_error("Failed to commit quota recompute"))?;
        Ok(Some(Recomputed {
            previous_used,
            record,
        }))
    }

    async fn set_max(&self, user_id: UserId, max_bytes: i64) -> AppResult<Option<QuotaRecord>> {
        sqlx::query_as::<_, QuotaRecord>(
            "UPDATE drive_quotas SET max_bytes = $2, updated_at = NOW() \
             WHERE user_id = $1 RETURNING *",
        )
        .bind(user_id)
        .bind(max_bytes)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update quota capacity"))
    }

    async fn list_all(&self) -> AppResult<Vec<QuotaRecord>> {
        sqlx::query_as::<_, QuotaRecord>("SELECT * FROM drive_quotas ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list quotas"))
    }

    async fn list_exceeding(&self) -> AppResult<Vec<QuotaRecord>> {
        sqlx::query_as::<_, QuotaRecord>(
            "SELECT * FROM drive_quotas WHERE used_bytes > max_bytes \
             ORDER BY used_bytes - max_bytes DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list quotas over capacity"))
    }

    async fn list_usage_above(&self, percentage: f64) -> AppResult<Vec<QuotaRecord>> {
        sqlx::query_as::<_, QuotaRecord>(
            "SELECT * FROM drive_quotas \
             WHERE max_bytes > 0 AND used_bytes * 100.0 / max_bytes >= $1 \
             ORDER BY used_bytes * 100.0 / max_bytes DESC",
        )
        .bind(percentage)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list quotas by usage"))
    }
}
