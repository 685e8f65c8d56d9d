//! Caller-facing drive operations.
//!
//! Every mutating call runs the same sequence: validate and resolve the
//! placement, charge quota (create only), write the registry or tree, then
//! settle quota (create failure or delete). Validation failures return before
//! anything is written.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use drive_core::config::QuotaConfig;
use drive_core::result::AppResult;
use drive_core::types::{FileId, FolderId};
use drive_database::Stores;
use drive_entity::file::DriveFile;
use drive_entity::folder::{Folder, FolderNode};
use drive_entity::quota::QuotaSnapshot;

use crate::context::RequestContext;
use crate::file::{CreateFileRequest, FileRegistry};
use crate::folder::{CreateFolderRequest, NamespaceTree, UpdateFolderRequest};
use crate::quota::QuotaLedger;

/// A folder with its ancestry and direct contents.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderDetails {
    /// The folder itself.
    pub folder: Folder,
    /// Ancestors from the root level down, ending with the folder.
    pub breadcrumbs: Vec<Folder>,
    /// Active child folders, ordered by name.
    pub subfolders: Vec<Folder>,
    /// Active files directly inside, ordered by name.
    pub files: Vec<DriveFile>,
}

/// Composes the namespace tree, file registry, and quota ledger.
#[derive(Debug, Clone)]
pub struct DriveFacade {
    tree: NamespaceTree,
    registry: FileRegistry,
    ledger: QuotaLedger,
}

impl DriveFacade {
    /// Creates a new façade from its components.
    pub fn new(tree: NamespaceTree, registry: FileRegistry, ledger: QuotaLedger) -> Self {
        Self {
            tree,
            registry,
            ledger,
        }
    }

    /// Wire every component to one set of stores.
    pub fn from_stores(stores: &Stores, quota: &QuotaConfig) -> Self {
        Self::new(
            NamespaceTree::new(Arc::clone(&stores.folders), Arc::clone(&stores.files)),
            FileRegistry::new(Arc::clone(&stores.files)),
            QuotaLedger::new(Arc::clone(&stores.quotas), Arc::clone(&stores.files), quota),
        )
    }

    /// The quota ledger, for maintenance callers.
    pub fn ledger(&self) -> &QuotaLedger {
        &self.ledger
    }

    // --- Folders ---

    /// Create a folder.
    pub async fn create_folder(
        &self,
        ctx: &RequestContext,
        req: CreateFolderRequest,
    ) -> AppResult<Folder> {
        self.tree.create_folder(ctx, req).await
    }

    /// Rename and/or reparent a folder.
    pub async fn update_folder(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
        req: UpdateFolderRequest,
    ) -> AppResult<Folder> {
        self.tree.update_folder(ctx, folder_id, req).await
    }

    /// Delete an empty folder.
    pub async fn delete_folder(&self, ctx: &RequestContext, folder_id: FolderId) -> AppResult<Folder> {
        self.tree.delete_folder(ctx, folder_id).await
    }

    /// Child folders of a folder, or of the root level.
    pub async fn list_children(
        &self,
        ctx: &RequestContext,
        parent_id: Option<FolderId>,
    ) -> AppResult<Vec<Folder>> {
        self.tree.list_children(ctx, parent_id).await
    }

    /// A folder with breadcrumbs, subfolders, and files.
    pub async fn folder_details(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
    ) -> AppResult<FolderDetails> {
        let folder = self.tree.resolve(ctx, folder_id).await?;
        let breadcrumbs = self.tree.breadcrumbs(ctx, &folder).await?;
        let subfolders = self.tree.list_children(ctx, Some(folder_id)).await?;
        let files = self.registry.list_in(ctx, Some(folder_id)).await?;

        Ok(FolderDetails {
            folder,
            breadcrumbs,
            subfolders,
            files,
        })
    }

    /// Nested folder view, from the root level or from `root`.
    pub async fn folder_tree(
        &self,
        ctx: &RequestContext,
        root: Option<FolderId>,
    ) -> AppResult<Vec<FolderNode>> {
        self.tree.tree(ctx, root).await
    }

    // --- Files ---

    /// Register a new file and charge its size to the owner's quota.
    ///
    /// The charge happens before the record is written; a rejected charge
    /// fails `Conflict` and nothing is written. If the write itself fails the
    /// charge is credited back.
    pub async fn create_file(
        &self,
        ctx: &RequestContext,
        req: CreateFileRequest,
    ) -> AppResult<DriveFile> {
        let data = self.registry.prepare(ctx, req)?;
        self.tree.resolve_placement(ctx, data.folder_id).await?;
        self.registry
            .ensure_name_free(ctx, data.folder_id, &data.name)
            .await?;

        self.ledger.reserve(ctx, data.size_bytes).await?;

        match self.registry.create(ctx, &data).await {
            Ok(file) => Ok(file),
            Err(e) => {
                self.settle(ctx, -data.size_bytes, "File write failed; releasing reserved quota")
                    .await;
                Err(e)
            }
        }
    }

    /// Rename a file in place.
    pub async fn rename_file(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
        new_name: &str,
    ) -> AppResult<DriveFile> {
        self.registry.rename(ctx, file_id, new_name).await
    }

    /// Soft-delete a file and credit its size back to the owner.
    pub async fn delete_file(&self, ctx: &RequestContext, file_id: FileId) -> AppResult<DriveFile> {
        let file = self.registry.soft_delete(ctx, file_id).await?;
        self.settle(ctx, -file.size_bytes, "Quota credited for deleted file").await;
        Ok(file)
    }

    /// A visible file.
    pub async fn get_file(&self, ctx: &RequestContext, file_id: FileId) -> AppResult<DriveFile> {
        self.registry.get(ctx, file_id).await
    }

    /// Resolve a file for download and record the access best-effort.
    pub async fn download_file(&self, ctx: &RequestContext, file_id: FileId) -> AppResult<DriveFile> {
        let file = self.registry.get(ctx, file_id).await?;
        self.registry.record_access(ctx, file_id).await;
        Ok(file)
    }

    /// Visible files in a folder, or at the root level.
    pub async fn list_files(
        &self,
        ctx: &RequestContext,
        folder_id: Option<FolderId>,
    ) -> AppResult<Vec<DriveFile>> {
        self.tree.resolve_placement(ctx, folder_id).await?;
        self.registry.list_in(ctx, folder_id).await
    }

    /// Every visible file of the acting user.
    pub async fn list_all_files(&self, ctx: &RequestContext) -> AppResult<Vec<DriveFile>> {
        self.registry.list_all(ctx).await
    }

    /// Visible files whose MIME type contains `pattern`.
    pub async fn list_files_by_type(
        &self,
        ctx: &RequestContext,
        pattern: &str,
    ) -> AppResult<Vec<DriveFile>> {
        self.registry.list_by_mime(ctx, pattern).await
    }

    // --- Quota ---

    /// The acting user's quota, creating the record on first access.
    pub async fn quota_snapshot(&self, ctx: &RequestContext) -> AppResult<QuotaSnapshot> {
        self.ledger.snapshot(ctx).await
    }

    /// Apply the quota side of a registry write.
    ///
    /// A failed update is logged, never returned; the drift it leaves is
    /// corrected by reconciliation.
    async fn settle(&self, ctx: &RequestContext, delta: i64, reason: &str) {
        match self.ledger.apply_delta(ctx, delta).await {
            Ok(record) => info!(
                user_id = %ctx.user_id,
                delta,
                used_bytes = record.used_bytes,
                "{reason}"
            ),
            Err(e) => warn!(
                user_id = %ctx.user_id,
                delta,
                error = %e,
                "Quota update failed; usage will be corrected by reconciliation"
            ),
        }
    }
}
