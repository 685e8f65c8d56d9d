//! File repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use drive_core::error::AppError;
use drive_core::result::AppResult;
use drive_core::types::{FileId, FolderId, UserId};
use drive_entity::file::{CreateFile, DriveFile, FileLifecycle};

use super::{db_error, is_unique_violation};
use crate::store::FileStore;

/// Unique index over active file names per folder.
const ACTIVE_NAME_INDEX: &str = "drive_files_active_name_idx";

/// Repository for the `drive_files` table.
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    /// Create a new file repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn name_conflict(name: &str) -> AppError {
    AppError::conflict(format!(
        "A file named '{name}' already exists in this location"
    ))
}

#[async_trait]
impl FileStore for FileRepository {
    async fn find_active(&self, user_id: UserId, file_id: FileId) -> AppResult<Option<DriveFile>> {
        sqlx::query_as::<_, DriveFile>(
            "SELECT * FROM drive_files WHERE id = $1 AND user_id = $2 AND state = $3",
        )
        .bind(file_id)
        .bind(user_id)
        .bind(FileLifecycle::Active)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find file"))
    }

    async fn list_in(
        &self,
        user_id: UserId,
        folder_id: Option<FolderId>,
    ) -> AppResult<Vec<DriveFile>> {
        sqlx::query_as::<_, DriveFile>(
            "SELECT * FROM drive_files \
             WHERE user_id = $1 AND folder_id IS NOT DISTINCT FROM $2 AND state = $3 \
             ORDER BY name ASC",
        )
        .bind(user_id)
        .bind(folder_id)
        .bind(FileLifecycle::Active)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list files"))
    }

    async fn list_active(&self, user_id: UserId) -> AppResult<Vec<DriveFile>> {
        sqlx::query_as::<_, DriveFile>(
            "SELECT * FROM drive_files WHERE user_id = $1 AND state = $2 \
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .bind(FileLifecycle::Active)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list files"))
    }

    async fn list_by_mime(&self, user_id: UserId, fragment: &str) -> AppResult<Vec<DriveFile>> {
        sqlx::query_as::<_, DriveFile>(
            "SELECT * FROM drive_files \
             WHERE user_id = $1 AND state = $2 AND strpos(lower(mime_type), lower($3)) > 0 \
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .bind(FileLifecycle::Active)
        .bind(fragment)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list files by type"))
    }

    async fn name_taken(
        &self,
        user_id: UserId,
        folder_id: Option<FolderId>,
        name: &str,
        exclude: Option<FileId>,
    ) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS ( \
                SELECT 1 FROM drive_files \
                 WHERE user_id = $1 AND folder_id IS NOT DISTINCT FROM $2 \
                   AND name = $3 AND state = 'active' \
                   AND ($4::uuid IS NULL OR id <> $4) \
             )",
        )
        .bind(user_id)
        .bind(folder_id)
        .bind(name)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to check file names"))
    }

    async fn insert(&self, data: &CreateFile) -> AppResult<DriveFile> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        if let Some(folder_id) = data.folder_id {
            sqlx::query_scalar::<_, FolderId>(
                "SELECT id FROM drive_folders \
                 WHERE id = $1 AND user_id = $2 AND is_active FOR SHARE",
            )
            .bind(folder_id)
            .bind(data.user_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("Failed to lock folder"))?
            .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))?;
        }

        let file = sqlx::query_as::<_, DriveFile>(
            "INSERT INTO drive_files \
                (id, user_id, tenant_id, folder_id, name, original_filename, storage_path, \
                 size_bytes, mime_type, extension) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
        )
        .bind(FileId::new())
        .bind(data.user_id)
        .bind(data.tenant_id)
        .bind(data.folder_id)
        .bind(&data.name)
        .bind(&data.original_filename)
        .bind(&data.storage_path)
        .bind(data.size_bytes)
        .bind(&data.mime_type)
        .bind(&data.extension)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, ACTIVE_NAME_INDEX) {
                name_conflict(&data.name)
            } else {
                db_error("Failed to create file record")(e)
            }
        })?;

        tx.commit().await.map_err(db_error("Failed to commit file creation"))?;
        Ok(file)
    }

    async fn rename(&self, user_id: UserId, file_id: FileId, name: &str) -> AppResult<DriveFile> {
        sqlx::query_as::<_, DriveFile>(
            "UPDATE drive_files SET name = $3, updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 AND state = 'active' RETURNING *",
        )
        .bind(file_id)
        .bind(user_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, ACTIVE_NAME_INDEX) {
                name_conflict(name)
            } else {
                db_error("Failed to rename file")(e)
            }
        })?
        .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))
    }

    async fn mark_deleted(
        &self,
        user_id: UserId,
        file_id: FileId,
    ) -> AppResult<Option<DriveFile>> {
        sqlx::query_as::<_, DriveFile>(
            "UPDATE drive_files \
                SET state = $3, deleted_at = NOW(), updated_at = NOW() \
              WHERE id = $1 AND user_id = $2 AND state = $4 RETURNING *",
        )
        .bind(file_id)
        .bind(user_id)
        .bind(FileLifecycle::Deleted)
        .bind(FileLifecycle::Active)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to delete file"))
    }

    async fn record_access(
        &self,
        user_id: UserId,
        file_id: FileId,
        at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE drive_files \
                SET download_count = download_count + 1, last_accessed_at = $3 \
              WHERE id = $1 AND user_id = $2 AND state = 'active'",
        )
        .bind(file_id)
        .bind(user_id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to record file access"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn active_bytes(&self, user_id: UserId) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(size_bytes), 0)::BIGINT FROM drive_files \
             WHERE user_id = $1 AND state = 'active'",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to sum file sizes"))
    }
}
