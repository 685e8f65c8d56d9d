//! File record registry: metadata validation, naming, and lifecycle.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use drive_core::error::AppError;
use drive_core::result::AppResult;
use drive_core::types::{FileId, FolderId};
use drive_database::FileStore;
use drive_entity::file::{CreateFile, DriveFile, derive_extension};
use drive_entity::naming::normalize_name;

use crate::context::RequestContext;

/// MIME type recorded when the caller supplies none.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Metadata for a new file record.
///
/// The bytes themselves live in an external blob store; the drive only keeps
/// the reference and the size it is told.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateFileRequest {
    /// Containing folder (None for root level).
    pub folder_id: Option<FolderId>,
    /// Display name.
    pub name: String,
    /// Name on the uploader's machine; defaults to `name`.
    pub original_filename: Option<String>,
    /// Opaque blob store reference.
    pub storage_path: String,
    /// Content size in bytes. Required.
    pub size_bytes: Option<i64>,
    /// MIME type; defaults to [`DEFAULT_MIME_TYPE`].
    pub mime_type: Option<String>,
    /// Extension; derived from the original filename when absent.
    pub extension: Option<String>,
}

/// Owns file records and their `Active -> Deleted` lifecycle.
///
/// The registry never touches quota; the façade pairs each size-changing
/// write here with a ledger update.
#[derive(Clone)]
pub struct FileRegistry {
    /// File persistence.
    files: Arc<dyn FileStore>,
}

impl std::fmt::Debug for FileRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileRegistry").finish_non_exhaustive()
    }
}

impl FileRegistry {
    /// Creates a new file registry.
    pub fn new(files: Arc<dyn FileStore>) -> Self {
        Self { files }
    }

    /// Find an active file owned by the acting user.
    pub async fn get(&self, ctx: &RequestContext, file_id: FileId) -> AppResult<DriveFile> {
        self.files
            .find_active(ctx.user_id, file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))
    }

    /// Validate request metadata into an insertable record.
    ///
    /// Performs no store access; placement is the caller's concern.
    pub fn prepare(&self, ctx: &RequestContext, req: CreateFileRequest) -> AppResult<CreateFile> {
        let name = normalize_name(&req.name, "File")?;

        let size_bytes = req
            .size_bytes
            .ok_or_else(|| AppError::invalid_input("File size is required"))?;
        if size_bytes < 0 {
            return Err(AppError::invalid_input("File size cannot be negative"));
        }

        let storage_path = req.storage_path.trim();
        if storage_path.is_empty() {
            return Err(AppError::invalid_input("Storage path is required"));
        }

        let original_filename = req
            .original_filename
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| name.clone());

        let mime_type = req
            .mime_type
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());

        let extension = req
            .extension
            .map(|s| s.trim().trim_start_matches('.').to_lowercase())
            .filter(|s| !s.is_empty())
            .or_else(|| derive_extension(&original_filename));

        Ok(CreateFile {
            user_id: ctx.user_id,
            tenant_id: ctx.tenant_id,
            folder_id: req.folder_id,
            name,
            original_filename,
            storage_path: storage_path.to_string(),
            size_bytes,
            mime_type,
            extension,
        })
    }

    /// Fail `Conflict` if an active file already uses `name` at the placement.
    pub async fn ensure_name_free(
        &self,
        ctx: &RequestContext,
        folder_id: Option<FolderId>,
        name: &str,
    ) -> AppResult<()> {
        if self
            .files
            .name_taken(ctx.user_id, folder_id, name, None)
            .await?
        {
            return Err(file_conflict(name));
        }
        Ok(())
    }

    /// Persist a prepared record.
    ///
    /// The store re-checks the name and the folder atomically with the insert.
    pub async fn create(&self, ctx: &RequestContext, data: &CreateFile) -> AppResult<DriveFile> {
        let file = self.files.insert(data).await?;

        info!(
            user_id = %ctx.user_id,
            file_id = %file.id,
            folder_id = ?file.folder_id,
            size_bytes = file.size_bytes,
            "File registered"
        );
        Ok(file)
    }

    /// Change a file's display name; size and storage reference never change.
    pub async fn rename(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
        new_name: &str,
    ) -> AppResult<DriveFile> {
        let name = normalize_name(new_name, "File")?;
        let current = self.get(ctx, file_id).await?;
        if current.name == name {
            return Ok(current);
        }

        if self
            .files
            .name_taken(ctx.user_id, current.folder_id, &name, Some(file_id))
            .await?
        {
            return Err(file_conflict(&name));
        }

        let file = self.files.rename(ctx.user_id, file_id, &name).await?;
        info!(
            user_id = %ctx.user_id,
            file_id = %file.id,
            old_name = %current.name,
            name = %file.name,
            "File renamed"
        );
        Ok(file)
    }

    /// Move a file to `Deleted`.
    ///
    /// Fails `NotFound` if the file is missing or already deleted, so the
    /// caller credits quota at most once per file.
    pub async fn soft_delete(&self, ctx: &RequestContext, file_id: FileId) -> AppResult<DriveFile> {
        let file = self
            .files
            .mark_deleted(ctx.user_id, file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;

        info!(
            user_id = %ctx.user_id,
            file_id = %file.id,
            size_bytes = file.size_bytes,
            "File deleted"
        );
        Ok(file)
    }

    /// Bump the download counter. Failures are logged, never returned.
    pub async fn record_access(&self, ctx: &RequestContext, file_id: FileId) {
        match self
            .files
            .record_access(ctx.user_id, file_id, ctx.request_time)
            .await
        {
            Ok(true) => debug!(user_id = %ctx.user_id, file_id = %file_id, "File access recorded"),
            Ok(false) => warn!(
                user_id = %ctx.user_id,
                file_id = %file_id,
                "File access not recorded: file no longer active"
            ),
            Err(e) => warn!(
                user_id = %ctx.user_id,
                file_id = %file_id,
                error = %e,
                "Failed to record file access"
            ),
        }
    }

    /// Active files directly in a folder (None = root level).
    pub async fn list_in(
        &self,
        ctx: &RequestContext,
        folder_id: Option<FolderId>,
    ) -> AppResult<Vec<DriveFile>> {
        self.files.list_in(ctx.user_id, folder_id).await
    }

    /// Every active file of the acting user, newest first.
    pub async fn list_all(&self, ctx: &RequestContext) -> AppResult<Vec<DriveFile>> {
        self.files.list_active(ctx.user_id).await
    }

    /// Active files whose MIME type contains `pattern`, e.g. `image/`.
    pub async fn list_by_mime(
        &self,
        ctx: &RequestContext,
        pattern: &str,
    ) -> AppResult<Vec<DriveFile>> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(AppError::invalid_input("MIME type pattern cannot be empty"));
        }
        self.files.list_by_mime(ctx.user_id, pattern).await
    }
}

fn file_conflict(name: &str) -> AppError {
    AppError::conflict(format!("A file named '{name}' already exists in this location"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use drive_core::error::ErrorKind;
    use drive_core::types::{TenantId, UserId};
    use drive_database::Stores;

    fn registry() -> FileRegistry {
        FileRegistry::new(Stores::memory().files)
    }

    fn ctx() -> RequestContext {
        RequestContext::new(UserId::new(), TenantId::new())
    }

    fn request(name: &str, size: i64) -> CreateFileRequest {
        CreateFileRequest {
            name: name.to_string(),
            storage_path: format!("blobs/{name}"),
            size_bytes: Some(size),
            ..CreateFileRequest::default()
        }
    }

    async fn register(registry: &FileRegistry, ctx: &RequestContext, name: &str) -> DriveFile {
        let data = registry.prepare(ctx, request(name, 10)).unwrap();
        registry.create(ctx, &data).await.unwrap()
    }

    #[test]
    fn test_prepare_fills_defaults() {
        let ctx = ctx();
        let data = registry()
            .prepare(
                &ctx,
                CreateFileRequest {
                    original_filename: Some("Holiday.JPG".into()),
                    mime_type: Some("  ".into()),
                    ..request(" photo ", 2048)
                },
            )
            .unwrap();

        assert_eq!(data.name, "photo");
        assert_eq!(data.user_id, ctx.user_id);
        assert_eq!(data.mime_type, DEFAULT_MIME_TYPE);
        assert_eq!(data.extension.as_deref(), Some("jpg"));
        assert_eq!(data.original_filename, "Holiday.JPG");
    }

    #[test]
    fn test_prepare_prefers_supplied_extension() {
        let data = registry()
            .prepare(
                &ctx(),
                CreateFileRequest {
                    extension: Some(".TAR".into()),
                    ..request("backup.tar.gz", 1)
                },
            )
            .unwrap();
        assert_eq!(data.extension.as_deref(), Some("tar"));
        assert_eq!(data.original_filename, "backup.tar.gz");
    }

    #[test]
    fn test_prepare_rejects_missing_metadata() {
        let registry = registry();
        let ctx = ctx();

        let cases = [
            CreateFileRequest { size_bytes: None, ..request("a.txt", 1) },
            request("a.txt", -1),
            request("", 1),
            CreateFileRequest { storage_path: " ".into(), ..request("a.txt", 1) },
        ];
        for req in cases {
            let err = registry.prepare(&ctx, req).unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidInput);
        }
    }

    #[tokio::test]
    async fn test_name_must_be_free_at_placement() {
        let registry = registry();
        let ctx = ctx();
        register(&registry, &ctx, "a.txt").await;

        let err = registry.ensure_name_free(&ctx, None, "a.txt").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        registry.ensure_name_free(&ctx, None, "A.txt").await.unwrap();

        let other = RequestContext::new(UserId::new(), ctx.tenant_id);
        registry.ensure_name_free(&other, None, "a.txt").await.unwrap();
    }

    #[tokio::test]
    async fn test_rename_checks_siblings() {
        let registry = registry();
        let ctx = ctx();
        let a = register(&registry, &ctx, "a.txt").await;
        register(&registry, &ctx, "b.txt").await;

        let err = registry.rename(&ctx, a.id, "b.txt").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        let same = registry.rename(&ctx, a.id, "a.txt").await.unwrap();
        assert_eq!(same.name, "a.txt");

        let renamed = registry.rename(&ctx, a.id, "c.txt").await.unwrap();
        assert_eq!(renamed.name, "c.txt");
        assert_eq!(renamed.size_bytes, a.size_bytes);
        assert_eq!(renamed.storage_path, a.storage_path);
    }

    #[tokio::test]
    async fn test_soft_delete_is_one_way() {
        let registry = registry();
        let ctx = ctx();
        let a = register(&registry, &ctx, "a.txt").await;

        let deleted = registry.soft_delete(&ctx, a.id).await.unwrap();
        assert!(!deleted.is_active());

        let again = registry.soft_delete(&ctx, a.id).await.unwrap_err();
        assert_eq!(again.kind, ErrorKind::NotFound);
        assert!(registry.get(&ctx, a.id).await.is_err());
        assert!(registry.list_all(&ctx).await.unwrap().is_empty());

        // The name is free again once the holder is deleted.
        register(&registry, &ctx, "a.txt").await;
    }

    #[tokio::test]
    async fn test_record_access_counts_and_tolerates_missing() {
        let registry = registry();
        let ctx = ctx();
        let a = register(&registry, &ctx, "a.txt").await;

        registry.record_access(&ctx, a.id).await;
        registry.record_access(&ctx, a.id).await;
        registry.record_access(&ctx, FileId::new()).await;

        let file = registry.get(&ctx, a.id).await.unwrap();
        assert_eq!(file.download_count, 2);
        assert!(file.last_accessed_at.is_some());
    }

    #[tokio::test]
    async fn test_list_by_mime() {
        let registry = registry();
        let ctx = ctx();
        for (name, mime) in [("a.png", "image/png"), ("b.jpg", "image/jpeg"), ("c.txt", "text/plain")] {
            let data = registry
                .prepare(&ctx, CreateFileRequest { mime_type: Some(mime.into()), ..request(name, 1) })
                .unwrap();
            registry.create(&ctx, &data).await.unwrap();
        }

        assert_eq!(registry.list_by_mime(&ctx, "IMAGE/").await.unwrap().len(), 2);
        assert_eq!(registry.list_by_mime(&ctx, "text").await.unwrap().len(), 1);
        let err = registry.list_by_mime(&ctx, " ").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInput);
    }
}
