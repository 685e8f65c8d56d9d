//! Folder tree structures for hierarchical display.

use drive_core::types::FolderId;
use serde::{Deserialize, Serialize};

/// A node in a user's folder tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderNode {
    /// Folder ID.
    pub id: FolderId,
    /// Folder name.
    pub name: String,
    /// Full path.
    pub path: String,
    /// Number of active files directly in this folder.
    pub file_count: u64,
    /// Child folder nodes, ordered by name.
    pub children: Vec<FolderNode>,
}
