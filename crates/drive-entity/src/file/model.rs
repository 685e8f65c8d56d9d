//! File entity model.

use chrono::{DateTime, Utc};
use drive_core::types::{FileId, FolderId, TenantId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::classify::{FileCategory, format_size};
use super::lifecycle::FileLifecycle;

/// Metadata for a file stored in a user's drive.
///
/// The content itself lives elsewhere; `storage_path` is an opaque locator
/// recorded verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    /// Unique file identifier.
    pub id: FileId,
    /// The owning user.
    pub user_id: UserId,
    /// Tenant of the owning user.
    pub tenant_id: TenantId,
    /// Containing folder (None for root level).
    pub folder_id: Option<FolderId>,
    /// Display name, unique among active files in the same folder.
    pub name: String,
    /// Name the file had on the uploader's machine.
    pub original_filename: String,
    /// Opaque content locator.
    pub storage_path: String,
    /// Content size in bytes.
    pub size_bytes: i64,
    /// MIME type reported at creation.
    pub mime_type: String,
    /// Lowercased extension derived from the original filename.
    pub extension: Option<String>,
    /// Lifecycle state.
    pub state: FileLifecycle,
    /// Number of recorded downloads.
    pub download_count: i64,
    /// Last recorded download.
    pub last_accessed_at: Option<DateTime<Utc>>,
    /// When the file was created.
    pub created_at: DateTime<Utc>,
    /// When the file was last renamed or deleted.
    pub updated_at: DateTime<Utc>,
    /// When the file was soft-deleted.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl DriveFile {
    /// Whether the file is visible and counted against quota.
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Human-readable size, e.g. `"1.5 MB"`.
    pub fn size_formatted(&self) -> String {
        format_size(self.size_bytes)
    }

    /// Coarse category derived from the MIME type.
    pub fn category(&self) -> FileCategory {
        FileCategory::from_mime(&self.mime_type)
    }
}

/// Data required to create a new file record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFile {
    /// The owning user.
    pub user_id: UserId,
    /// Tenant of the owning user.
    pub tenant_id: TenantId,
    /// Containing folder (None for root level).
    pub folder_id: Option<FolderId>,
    /// Validated display name.
    pub name: String,
    /// Name on the uploader's machine.
    pub original_filename: String,
    /// Opaque content locator.
    pub storage_path: String,
    /// Content size in bytes.
    pub size_bytes: i64,
    /// MIME type.
    pub mime_type: String,
    /// Derived extension.
    pub extension: Option<String>,
}
