//! Folder create, rename, move, and delete.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use drive_core::error::AppError;
use drive_core::result::AppResult;
use drive_core::types::FolderId;
use drive_database::{FileStore, FolderStore};
use drive_entity::folder::{CreateFolder, Folder, FolderNode, RelocateFolder};
use drive_entity::naming::normalize_name;

use crate::context::RequestContext;
use crate::folder::tree::build_forest;

/// Longest accepted folder description, in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;

/// Request to create a new folder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateFolderRequest {
    /// Folder name.
    pub name: String,
    /// Parent folder ID (None for root level).
    pub parent_id: Option<FolderId>,
    /// Optional description.
    pub description: Option<String>,
}

/// Request to rename and/or move a folder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFolderRequest {
    /// New name; pass the current name to keep it.
    pub name: String,
    /// `None` keeps the current parent, `Some(None)` moves to root level,
    /// `Some(Some(id))` moves under `id`.
    pub parent_id: Option<Option<FolderId>>,
    /// `None` keeps the description; a blank string clears it.
    pub description: Option<String>,
}

/// Owns the per-user folder hierarchy.
///
/// Folders form an arena keyed by id: each row stores its parent id and
/// children are found by query. Paths are materialized on write.
#[derive(Clone)]
pub struct NamespaceTree {
    /// Folder persistence.
    folders: Arc<dyn FolderStore>,
    /// File persistence, for per-folder file counts.
    files: Arc<dyn FileStore>,
}

impl std::fmt::Debug for NamespaceTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamespaceTree").finish_non_exhaustive()
    }
}

impl NamespaceTree {
    /// Creates a new namespace tree.
    pub fn new(folders: Arc<dyn FolderStore>, files: Arc<dyn FileStore>) -> Self {
        Self { folders, files }
    }

    /// Resolve an active folder owned by the acting user.
    pub async fn resolve(&self, ctx: &RequestContext, folder_id: FolderId) -> AppResult<Folder> {
        self.folders
            .find_active(ctx.user_id, folder_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))
    }

    /// Resolve an optional placement; `None` is the root level.
    pub async fn resolve_placement(
        &self,
        ctx: &RequestContext,
        folder_id: Option<FolderId>,
    ) -> AppResult<Option<Folder>> {
        match folder_id {
            Some(id) => self.resolve(ctx, id).await.map(Some),
            None => Ok(None),
        }
    }

    /// Creates a new folder.
    pub async fn create_folder(
        &self,
        ctx: &RequestContext,
        req: CreateFolderRequest,
    ) -> AppResult<Folder> {
        let name = normalize_name(&req.name, "Folder")?;
        let description = normalize_description(req.description)?;

        if let Some(parent_id) = req.parent_id {
            self.resolve(ctx, parent_id).await.map_err(|_| {
                AppError::not_found(format!("Parent folder {parent_id} not found"))
            })?;
        }

        if self
            .folders
            .sibling_exists(ctx.user_id, req.parent_id, &name, None)
            .await?
        {
            return Err(AppError::conflict(format!(
                "A folder named '{name}' already exists in this location"
            )));
        }

        let folder = self
            .folders
            .insert(&CreateFolder {
                user_id: ctx.user_id,
                tenant_id: ctx.tenant_id,
                parent_id: req.parent_id,
                name,
                description,
            })
            .await?;

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder.id,
            path = %folder.path,
            "Folder created"
        );
        Ok(folder)
    }

    /// Rename and/or move a folder.
    ///
    /// Descendant paths are rewritten with it. Moving a folder under itself
    /// or one of its descendants fails `InvalidInput`.
    pub async fn update_folder(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
        req: UpdateFolderRequest,
    ) -> AppResult<Folder> {
        let current = self.resolve(ctx, folder_id).await?;
        let name = normalize_name(&req.name, "Folder")?;
        let description = match req.description {
            Some(text) => normalize_description(Some(text))?,
            None => current.description.clone(),
        };
        let parent_id = req.parent_id.unwrap_or(current.parent_id);

        if let Some(new_parent) = parent_id
            && Some(new_parent) != current.parent_id
        {
            self.ensure_not_within(ctx, folder_id, new_parent).await?;
        }

        if self
            .folders
            .sibling_exists(ctx.user_id, parent_id, &name, Some(folder_id))
            .await?
        {
            return Err(AppError::conflict(format!(
                "A folder named '{name}' already exists in this location"
            )));
        }

        let folder = self
            .folders
            .relocate(&RelocateFolder {
                user_id: ctx.user_id,
                folder_id,
                name,
                parent_id,
                description,
            })
            .await?;

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder.id,
            old_path = %current.path,
            path = %folder.path,
            "Folder updated"
        );
        Ok(folder)
    }

    /// Deactivate an empty folder.
    ///
    /// Never recursive: a folder with any active subfolder or file fails
    /// `Conflict` and is left unchanged.
    pub async fn delete_folder(&self, ctx: &RequestContext, folder_id: FolderId) -> AppResult<Folder> {
        self.resolve(ctx, folder_id).await?;
        let folder = self.folders.deactivate_if_empty(ctx.user_id, folder_id).await?;

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder.id,
            path = %folder.path,
            "Folder deleted"
        );
        Ok(folder)
    }

    /// Active folders directly under `parent_id` (None = root level).
    pub async fn list_children(
        &self,
        ctx: &RequestContext,
        parent_id: Option<FolderId>,
    ) -> AppResult<Vec<Folder>> {
        self.resolve_placement(ctx, parent_id).await?;
        self.folders.list_children(ctx.user_id, parent_id).await
    }


    /// Ancestors of a folder from the root level down, ending with the
    /// folder itself.
    pub async fn breadcrumbs(&self, ctx: &RequestContext, folder: &Folder) -> AppResult<Vec<Folder>> {
        let mut chain = vec![folder.clone()];
        let mut seen = HashSet::from([folder.id]);
        let mut child_id = folder.id;
        let mut next = folder.parent_id;

        while let Some(parent_id) = next {
            if !seen.insert(parent_id) {
                return Err(AppError::inconsistent(format!(
                    "Folder {} has a cyclic parent chain",
                    folder.id
                )));
            }
            let parent = self
                .folders
                .find_active(ctx.user_id, parent_id)
                .await?
                .ok_or_else(|| {
                    AppError::inconsistent(format!(
                        "Folder {child_id} references missing parent {parent_id}"
                    ))
                })?;
            child_id = parent.id;
            next = parent.parent_id;
            chain.push(parent);
        }

        chain.reverse();
        Ok(chain)
    }

    /// Nested view of the user's folders.
    ///
    /// With `root` set, returns a single-element forest rooted there.
    pub async fn tree(
        &self,
        ctx: &RequestContext,
        root: Option<FolderId>,
    ) -> AppResult<Vec<FolderNode>> {
        self.resolve_placement(ctx, root).await?;
        let folders = self.folders.list_active(ctx.user_id).await?;
        let files = self.files.list_active(ctx.user_id).await?;
        Ok(build_forest(&folders, &files, root))
    }

    /// Fail `InvalidInput` if `candidate_parent` is `folder_id` or below it.
    ///
    /// Walks up from the candidate parent; the store repeats the check
    /// atomically when it applies the move.
    async fn ensure_not_within(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
        candidate_parent: FolderId,
    ) -> AppResult<()> {
        let mut seen = HashSet::new();
        let mut next = Some(candidate_parent);

        while let Some(id) = next {
            if id == folder_id {
                return Err(AppError::invalid_input(
                    "Cannot move a folder into itself or one of its descendants",
                ));
            }
            if !seen.insert(id) {
                return Err(AppError::inconsistent(format!(
                    "Folder {id} has a cyclic parent chain"
                )));
            }
            let folder = self
                .folders
                .find_active(ctx.user_id, id)
                .await?
                .ok_or_else(|| {
                    if id == candidate_parent {
                        AppError::not_found(format!("Parent folder {id} not found"))
                    } else {
                        AppError::inconsistent(format!(
                            "Folder chain above {candidate_parent} is broken at {id}"
                        ))
                    }
                })?;
            next = folder.parent_id;
        }
        Ok(())
    }
}

/// Trim a description; blank becomes `None`.
fn normalize_description(description: Option<String>) -> AppResult<Option<String>> {
    let Some(text) = description else {
        return Ok(None);
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(AppError::invalid_input(format!(
            "Folder description must be at most {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }
    Ok(Some(trimmed.to_string()))
}
