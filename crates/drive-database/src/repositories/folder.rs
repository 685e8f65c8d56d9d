//! Folder repository implementation.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use drive_core::error::AppError;
use drive_core::result::AppResult;
use drive_core::types::{FolderId, UserId};
use drive_entity::folder::path::child_path;
use drive_entity::folder::{CreateFolder, Folder, RelocateFolder};

use super::{db_error, is_unique_violation};
use crate::store::{FolderContents, FolderStore};

/// Unique index over active sibling names.
const SIBLING_NAME_INDEX: &str = "drive_folders_active_sibling_idx";

/// Repository for the `drive_folders` table.
#[derive(Debug, Clone)]
pub struct FolderRepository {
    pool: PgPool,
}

impl FolderRepository {
    /// Create a new folder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lock an active parent row against concurrent deactivation and
    /// return its path.
    async fn lock_parent_path(
        tx: &mut Transaction<'_, Postgres>,
        user_id: UserId,
        parent_id: FolderId,
    ) -> AppResult<String> {
        sqlx::query_scalar::<_, String>(
            "SELECT path FROM drive_folders \
             WHERE id = $1 AND user_id = $2 AND is_active FOR SHARE",
        )
        .bind(parent_id)
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(db_error("Failed to lock parent folder"))?
        .ok_or_else(|| AppError::not_found(format!("Parent folder {parent_id} not found")))
    }

    /// Count active children and files of a folder inside a transaction.
    async fn count_contents(
        tx: &mut Transaction<'_, Postgres>,
        user_id: UserId,
        folder_id: FolderId,
    ) -> AppResult<FolderContents> {
        let (child_folders, files): (i64, i64) = sqlx::query_as(
            "SELECT \
                (SELECT COUNT(*) FROM drive_folders \
                  WHERE user_id = $1 AND parent_id = $2 AND is_active), \
                (SELECT COUNT(*) FROM drive_files \
                  WHERE user_id = $1 AND folder_id = $2 AND state = 'active')",
        )
        .bind(user_id)
        .bind(folder_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(db_error("Failed to count folder contents"))?;

        Ok(FolderContents {
            child_folders: child_folders as u64,
            files: files as u64,
        })
    }
}

#[async_trait]
impl FolderStore for FolderRepository {
    async fn find_active(
        &self,
        user_id: UserId,
        folder_id: FolderId,
    ) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM drive_folders WHERE id = $1 AND user_id = $2 AND is_active",
        )
        .bind(folder_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find folder"))
    }

    async fn list_children(
        &self,
        user_id: UserId,
        parent_id: Option<FolderId>,
    ) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM drive_folders \
             WHERE user_id = $1 AND parent_id IS NOT DISTINCT FROM $2 AND is_active \
             ORDER BY name ASC",
        )
        .bind(user_id)
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list child folders"))
    }

    async fn list_active(&self, user_id: UserId) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM drive_folders WHERE user_id = $1 AND is_active ORDER BY path ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list folders"))
    }

    async fn sibling_exists(
        &self,
        user_id: UserId,
        parent_id: Option<FolderId>,
        name: &str,
        exclude: Option<FolderId>,
    ) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS ( \
                SELECT 1 FROM drive_folders \
                 WHERE user_id = $1 AND parent_id IS NOT DISTINCT FROM $2 \
                   AND name = $3 AND is_active \
                   AND ($4::uuid IS NULL OR id <> $4) \
             )",
        )
        .bind(user_id)
        .bind(parent_id)
        .bind(name)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to check sibling folder names"))
    }

    async fn insert(&self, data: &CreateFolder) -> AppResult<Folder> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        let parent_path = match data.parent_id {
            Some(parent_id) => Some(Self::lock_parent_path(&mut tx, data.user_id, parent_id).await?),
            None => None,
        };
        let path = child_path(parent_path.as_deref(), &data.name);

        let folder = sqlx::query_as::<_, Folder>(
            "INSERT INTO drive_folders (id, user_id, tenant_id, parent_id, name, path, description) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(FolderId::new())
        .bind(data.user_id)
        .bind(data.tenant_id)
        .bind(data.parent_id)
        .bind(&data.name)
        .bind(&path)
        .bind(&data.description)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, SIBLING_NAME_INDEX) {
                AppError::conflict(format!(
                    "A folder named '{}' already exists in this location",
                    data.name
                ))
            } else {
                db_error("Failed to create folder")(e)
            }
        })?;

        tx.commit().await.map_err(db_error("Failed to commit folder creation"))?;
        Ok(folder)
    }

    async fn relocate(&self, data: &RelocateFolder) -> AppResult<Folder> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        // Moves within one user's tree are serialized so two concurrent
        // moves cannot jointly form a cycle.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text, 0))")
            .bind(data.user_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to acquire namespace lock"))?;

        let current = sqlx::query_as::<_, Folder>(
            "SELECT * FROM drive_folders \
             WHERE id = $1 AND user_id = $2 AND is_active FOR UPDATE",
        )
        .bind(data.folder_id)
        .bind(data.user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to load folder"))?
        .ok_or_else(|| AppError::not_found(format!("Folder {} not found", data.folder_id)))?;

        let parent_path = match data.parent_id {
            Some(parent_id) => {
                let forms_cycle = sqlx::query_scalar::<_, bool>(
                    "WITH RECURSIVE ancestors AS ( \
                        SELECT id, parent_id FROM drive_folders WHERE id = $1 AND user_id = $3 \
                        UNION \
                        SELECT f.id, f.parent_id FROM drive_folders f \
                          INNER JOIN ancestors a ON f.id = a.parent_id \
                     ) SELECT EXISTS (SELECT 1 FROM ancestors WHERE id = $2)",
                )
                .bind(parent_id)
                .bind(data.folder_id)
                .bind(data.user_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(db_error("Failed to check folder ancestry"))?;

                if forms_cycle {
                    return Err(AppError::invalid_input(
                        "Cannot move a folder into itself or one of its descendants",
                    ));
                }
                Some(Self::lock_parent_path(&mut tx, data.user_id, parent_id).await?)
            }
            None => None,
        };
        let new_path = child_path(parent_path.as_deref(), &data.name);

        let folder = sqlx::query_as::<_, Folder>(
            "UPDATE drive_folders \
                SET name = $3, parent_id = $4, path = $5, description = $6, updated_at = NOW() \
              WHERE id = $1 AND user_id = $2 RETURNING *",
        )
        .bind(data.folder_id)
        .bind(data.user_id)
        .bind(&data.name)
        .bind(data.parent_id)
        .bind(&new_path)
        .bind(&data.description)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, SIBLING_NAME_INDEX) {
                AppError::conflict(format!(
                    "A folder named '{}' already exists in this location",
                    data.name
                ))
            } else {
                db_error("Failed to update folder")(e)
            }
        })?;

        if current.path != new_path {
            sqlx::query(
                "WITH RECURSIVE subtree AS ( \
                    SELECT id FROM drive_folders WHERE parent_id = $1 \
                    UNION \
                    SELECT f.id FROM drive_folders f INNER JOIN subtree s ON f.parent_id = s.id \
                 ) \
                 UPDATE drive_folders d \
                    SET path = $3 || substr(d.path, length($2) + 1), updated_at = NOW() \
                   FROM subtree WHERE d.id = subtree.id",
            )
            .bind(data.folder_id)
            .bind(&current.path)
            .bind(&new_path)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to rewrite descendant paths"))?;
        }

        tx.commit().await.map_err(db_error("Failed to commit folder update"))?;
        Ok(folder)
    }

    async fn deactivate_if_empty(
        &self,
        user_id: UserId,
        folder_id: FolderId,
    ) -> AppResult<Folder> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        // FOR UPDATE conflicts with the FOR SHARE taken by inserts into this
        // folder, so no child can appear between the count and the update.
        sqlx::query_scalar::<_, FolderId>(
            "SELECT id FROM drive_folders \
             WHERE id = $1 AND user_id = $2 AND is_active FOR UPDATE",
        )
        .bind(folder_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to lock folder"))?
        .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))?;

        let contents = Self::count_contents(&mut tx, user_id, folder_id).await?;
        if contents.child_folders > 0 {
            return Err(AppError::conflict(
                "Cannot delete folder that contains subfolders",
            ));
        }
        if contents.files > 0 {
            return Err(AppError::conflict("Cannot delete folder that contains files"));
        }

        let folder = sqlx::query_as::<_, Folder>(
            "UPDATE drive_folders SET is_active = FALSE, updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 RETURNING *",
        )
        .bind(folder_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to deactivate folder"))?;

        tx.commit().await.map_err(db_error("Failed to commit folder deletion"))?;
        Ok(folder)
    }
}
