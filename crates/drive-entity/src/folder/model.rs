//! Folder entity model.

use chrono::{DateTime, Utc};
use drive_core::types::{FolderId, TenantId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A folder in a user's namespace tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    /// Unique folder identifier.
    pub id: FolderId,
    /// The owning user.
    pub user_id: UserId,
    /// Tenant of the owning user.
    pub tenant_id: TenantId,
    /// Parent folder (None for root-level folders).
    pub parent_id: Option<FolderId>,
    /// Folder name, unique among active siblings.
    pub name: String,
    /// Materialized path (e.g., `/Docs/Reports`).
    pub path: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Deactivated folders are invisible to every read.
    pub is_active: bool,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last renamed, moved, or deactivated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a new folder.
///
/// The store materializes `path` from the parent row it locks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolder {
    /// The owning user.
    pub user_id: UserId,
    /// Tenant of the owning user.
    pub tenant_id: TenantId,
    /// Parent folder (None for root level).
    pub parent_id: Option<FolderId>,
    /// Validated folder name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
}

/// A rename and/or move of an existing folder.
///
/// The store rewrites the path of the folder and every descendant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelocateFolder {
    /// The owning user.
    pub user_id: UserId,
    /// Folder being changed.
    pub folder_id: FolderId,
    /// New (or unchanged) validated name.
    pub name: String,
    /// New (or unchanged) parent.
    pub parent_id: Option<FolderId>,
    /// New (or unchanged) description.
    pub description: Option<String>,
}
