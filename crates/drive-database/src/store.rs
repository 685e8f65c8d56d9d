//! Store traits consumed by the service layer.
//!
//! Every method is scoped to an owning user; a row that belongs to another
//! user is indistinguishable from a missing row. Implementations must make
//! each method atomic on its own: sibling-name uniqueness is enforced at
//! write time, a folder cannot gain children while it is being deactivated,
//! and quota deltas are applied as a single increment rather than a
//! read-modify-write.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use drive_core::config::{DatabaseBackend, DatabaseConfig};
use drive_core::result::AppResult;
use drive_core::types::{FileId, FolderId, UserId};
use drive_entity::file::{CreateFile, DriveFile};
use drive_entity::folder::{CreateFolder, Folder, RelocateFolder};
use drive_entity::quota::{CreateQuota, QuotaRecord};

use crate::connection::DatabasePool;
use crate::memory::MemoryStore;
use crate::migration::run_migrations;
use crate::repositories::{FileRepository, FolderRepository, QuotaRepository};

/// Active items directly inside a folder, counted before deactivation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct FolderContents {
    pub(crate) child_folders: u64,
    pub(crate) files: u64,
}

/// Result of a conditional quota charge.
#[derive(Debug, Clone, PartialEq)]
pub enum Charge {
    /// The bytes were added to `used_bytes`.
    Applied(QuotaRecord),
    /// Not enough room; the record is unchanged.
    Insufficient(QuotaRecord),
    /// The user has no quota record yet.
    NoRecord,
}

/// Result of recomputing a user's usage from their active files.
#[derive(Debug, Clone, PartialEq)]
pub struct Recomputed {
    /// `used_bytes` before the correction.
    pub previous_used: i64,
    /// The record after the correction.
    pub record: QuotaRecord,
}

/// Folder persistence.
#[async_trait]
pub trait FolderStore: Send + Sync {
    /// Find an active folder owned by `user_id`.
    async fn find_active(&self, user_id: UserId, folder_id: FolderId)
    -> AppResult<Option<Folder>>;

    /// Active folders directly under `parent_id` (None = root), ordered by name.
    async fn list_children(
        &self,
        user_id: UserId,
        parent_id: Option<FolderId>,
    ) -> AppResult<Vec<Folder>>;

    /// Every active folder owned by `user_id`, ordered by path.
    async fn list_active(&self, user_id: UserId) -> AppResult<Vec<Folder>>;

    /// Whether an active folder named `name` exists under `parent_id`,
    /// ignoring `exclude`.
    async fn sibling_exists(
        &self,
        user_id: UserId,
        parent_id: Option<FolderId>,
        name: &str,
        exclude: Option<FolderId>,
    ) -> AppResult<bool>;

    /// Insert a folder, materializing its path from the parent.
    ///
    /// Fails `NotFound` if the parent is missing or inactive and `Conflict`
    /// if an active sibling already has the name.
    async fn insert(&self, data: &CreateFolder) -> AppResult<Folder>;

    /// Rename and/or move a folder and rewrite the paths of its descendants.
    ///
    /// Fails `NotFound` for a missing folder or parent, `InvalidInput` if the
    /// new parent is the folder itself or one of its descendants, and
    /// `Conflict` on a sibling name collision.
    async fn relocate(&self, data: &RelocateFolder) -> AppResult<Folder>;

    /// Deactivate a folder that has no active children or files.
    ///
    /// The emptiness check and the update happen atomically.
    async fn deactivate_if_empty(&self, user_id: UserId, folder_id: FolderId)
    -> AppResult<Folder>;
}

/// File record persistence.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Find an active file owned by `user_id`.
    async fn find_active(&self, user_id: UserId, file_id: FileId) -> AppResult<Option<DriveFile>>;

    /// Active files directly in `folder_id` (None = root), ordered by name.
    async fn list_in(&self, user_id: UserId, folder_id: Option<FolderId>)
    -> AppResult<Vec<DriveFile>>;

    /// Every active file owned by `user_id`, newest first.
    async fn list_active(&self, user_id: UserId) -> AppResult<Vec<DriveFile>>;

    /// Active files whose MIME type contains `fragment` (case-insensitive).
    async fn list_by_mime(&self, user_id: UserId, fragment: &str) -> AppResult<Vec<DriveFile>>;

    /// Whether an active file named `name` exists in `folder_id`, ignoring
    /// `exclude`.
    async fn name_taken(
        &self,
        user_id: UserId,
        folder_id: Option<FolderId>,
        name: &str,
        exclude: Option<FileId>,
    ) -> AppResult<bool>;

    /// Insert an active file record.
    ///
    /// Fails `NotFound` if the folder is missing or inactive and `Conflict`
    /// if the name is taken.
    async fn insert(&self, data: &CreateFile) -> AppResult<DriveFile>;

    /// Change only the display name of an active file.
    async fn rename(&self, user_id: UserId, file_id: FileId, name: &str) -> AppResult<DriveFile>;

    /// Move an active file to `Deleted`.
    ///
    /// Returns `None` if the file is missing or already deleted, so a
    /// repeated delete never credits quota twice.
    async fn mark_deleted(&self, user_id: UserId, file_id: FileId)
    -> AppResult<Option<DriveFile>>;

    /// Bump the download counter and set the last-access time.
    ///
    /// Returns `false` if no active file matched.
    async fn record_access(
        &self,
        user_id: UserId,
        file_id: FileId,
        at: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Sum of `size_bytes` over the user's active files.
    async fn active_bytes(&self, user_id: UserId) -> AppResult<i64>;
}

/// Quota ledger persistence.
#[async_trait]
pub trait QuotaStore: Send + Sync {
    /// Find the user's quota record.
    async fn find(&self, user_id: UserId) -> AppResult<Option<QuotaRecord>>;

    /// Insert a record unless one exists; returns whichever record won.
    async fn insert_if_absent(&self, data: &CreateQuota) -> AppResult<QuotaRecord>;

    /// Add `bytes` to usage only if they fit under the capacity.
    async fn try_charge(&self, user_id: UserId, bytes: i64) -> AppResult<Charge>;

    /// Atomically set `used = max(0, used + delta)`.
    async fn apply_delta(&self, user_id: UserId, delta: i64) -> AppResult<Option<QuotaRecord>>;

    /// Replace usage with the sum of the user's active file sizes.
    async fn recompute(&self, user_id: UserId) -> AppResult<Option<Recomputed>>;

    /// Change the capacity.
    async fn set_max(&self, user_id: UserId, max_bytes: i64) -> AppResult<Option<QuotaRecord>>;

    /// Every quota record.
    async fn list_all(&self) -> AppResult<Vec<QuotaRecord>>;

    /// Records whose usage is above capacity.
    async fn list_exceeding(&self) -> AppResult<Vec<QuotaRecord>>;

    /// Records whose usage percentage is at least `percentage`.
    async fn list_usage_above(&self, percentage: f64) -> AppResult<Vec<QuotaRecord>>;
}

/// The three stores backing one drive, plus the pool when PostgreSQL is used.
#[derive(Clone)]
pub struct Stores {
    /// Folder persistence.
    pub folders: Arc<dyn FolderStore>,
    /// File persistence.
    pub files: Arc<dyn FileStore>,
    /// Quota persistence.
    pub quotas: Arc<dyn QuotaStore>,
    pool: Option<DatabasePool>,
}

impl Stores {
    /// Open the backend selected in configuration.
    ///
    /// For PostgreSQL this connects the pool and, when enabled, applies
    /// pending migrations.
    pub async fn open(config: &DatabaseConfig) -> AppResult<Self> {
        match config.backend {
            DatabaseBackend::Postgres => {
                let pool = DatabasePool::connect(config).await?;
                if config.run_migrations {
                    run_migrations(pool.pool()).await?;
                }
                Ok(Self::postgres(pool))
            }
            DatabaseBackend::Memory => {
                info!("Using in-memory drive store; data will not survive a restart");
                Ok(Self::memory())
            }
        }
    }

    /// PostgreSQL-backed stores sharing one pool.
    pub fn postgres(pool: DatabasePool) -> Self {
        let pg = pool.pool().clone();
        Self {
            folders: Arc::new(FolderRepository::new(pg.clone())),
            files: Arc::new(FileRepository::new(pg.clone())),
            quotas: Arc::new(QuotaRepository::new(pg)),
            pool: Some(pool),
        }
    }

    /// Fresh in-memory stores sharing one state.
    pub fn memory() -> Self {
        Self::from_memory(MemoryStore::new())
    }

    /// Stores backed by an existing in-memory state.
    pub fn from_memory(store: MemoryStore) -> Self {
        Self {
            folders: Arc::new(store.clone()),
            files: Arc::new(store.clone()),
            quotas: Arc::new(store),
            pool: None,
        }
    }

    /// Name of the active backend.
    pub fn backend(&self) -> DatabaseBackend {
        if self.pool.is_some() {
            DatabaseBackend::Postgres
        } else {
            DatabaseBackend::Memory
        }
    }

    /// Check backend connectivity. The in-memory backend is always healthy.
    pub async fn health_check(&self) -> AppResult<bool> {
        match &self.pool {
            Some(pool) => pool.health_check().await,
            None => Ok(true),
        }
    }

    /// Release backend resources.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}

impl fmt::Debug for Stores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stores")
            .field("backend", &self.backend())
            .finish_non_exhaustive()
    }
}
