//! Process-local store.
//!
//! All three store traits share one state behind a single `RwLock`, so every
//! trait method runs as one critical section. That gives the same guarantees
//! the PostgreSQL repositories get from row locks and unique indexes.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use drive_core::error::AppError;
use drive_core::result::AppResult;
use drive_core::types::{FileId, FolderId, QuotaId, UserId};
use drive_entity::file::{CreateFile, DriveFile, FileLifecycle};
use drive_entity::folder::path::{child_path, rebase};
use drive_entity::folder::{CreateFolder, Folder, RelocateFolder};
use drive_entity::quota::{CreateQuota, QuotaRecord};

use crate::store::{Charge, FileStore, FolderContents, FolderStore, QuotaStore, Recomputed};

#[derive(Debug, Default)]
struct MemoryState {
    folders: HashMap<FolderId, Folder>,
    files: HashMap<FileId, DriveFile>,
    quotas: HashMap<UserId, QuotaRecord>,
}

impl MemoryState {
    fn active_folder(&self, user_id: UserId, folder_id: FolderId) -> Option<&Folder> {
        self.folders
            .get(&folder_id)
            .filter(|f| f.user_id == user_id && f.is_active)
    }

    fn active_file(&self, user_id: UserId, file_id: FileId) -> Option<&DriveFile> {
        self.files
            .get(&file_id)
            .filter(|f| f.user_id == user_id && f.is_active())
    }

    fn folder_sibling_exists(
        &self,
        user_id: UserId,
        parent_id: Option<FolderId>,
        name: &str,
        exclude: Option<FolderId>,
    ) -> bool {
        self.folders.values().any(|f| {
            f.user_id == user_id
                && f.is_active
                && f.parent_id == parent_id
                && f.name == name
                && Some(f.id) != exclude
        })
    }

    fn file_name_taken(
        &self,
        user_id: UserId,
        folder_id: Option<FolderId>,
        name: &str,
        exclude: Option<FileId>,
    ) -> bool {
        self.files.values().any(|f| {
            f.user_id == user_id
                && f.is_active()
                && f.folder_id == folder_id
                && f.name == name
                && Some(f.id) != exclude
        })
    }

    fn contents(&self, user_id: UserId, folder_id: FolderId) -> FolderContents {
        let child_folders = self
            .folders
            .values()
            .filter(|f| f.user_id == user_id && f.is_active && f.parent_id == Some(folder_id))
            .count() as u64;
        let files = self
            .files
            .values()
            .filter(|f| f.user_id == user_id && f.is_active() && f.folder_id == Some(folder_id))
            .count() as u64;
        FolderContents {
            child_folders,
            files,
        }
    }

    fn parent_path(&self, user_id: UserId, parent_id: Option<FolderId>) -> AppResult<Option<String>> {
        match parent_id {
            Some(id) => self
                .active_folder(user_id, id)
                .map(|p| Some(p.path.clone()))
                .ok_or_else(|| AppError::not_found(format!("Parent folder {id} not found"))),
            None => Ok(None),
        }
    }

    /// Whether `ancestor` appears on the parent chain starting at `start`.
    fn is_ancestor_or_self(&self, ancestor: FolderId, start: FolderId) -> bool {
        let mut current = Some(start);
        let mut steps = 0;
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.folders.len() {
                // Corrupt parent links; treat as a cycle.
                return true;
            }
            current = self.folders.get(&id).and_then(|f| f.parent_id);
        }
        false
    }

    fn descendants(&self, root: FolderId) -> Vec<FolderId> {
        let mut found = Vec::new();
        let mut frontier = vec![root];
        while let Some(parent) = frontier.pop() {
            for folder in self.folders.values() {
                if folder.parent_id == Some(parent) && !found.contains(&folder.id) {
                    found.push(folder.id);
                    frontier.push(folder.id);
                }
            }
        }
        found
    }

    fn active_bytes(&self, user_id: UserId) -> i64 {
        self.files
            .values()
            .filter(|f| f.user_id == user_id && f.is_active())
            .map(|f| f.size_bytes)
            .sum()
    }
}

/// In-memory implementation of every drive store.
///
/// Cloning is cheap and clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a user's `used_bytes` without touching files.
    ///
    /// Exists so maintenance tooling and tests can simulate drift.
    pub async fn force_used_bytes(&self, user_id: UserId, used_bytes: i64) -> bool {
        let mut state = self.state.write().await;
        match state.quotas.get_mut(&user_id) {
            Some(record) => {
                record.used_bytes = used_bytes;
                record.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }
}

fn folder_conflict(name: &str) -> AppError {
    AppError::conflict(format!(
        "A folder named '{name}' already exists in this location"
    ))
}

fn file_conflict(name: &str) -> AppError {
    AppError::conflict(format!(
        "A file named '{name}' already exists in this location"
    ))
}

fn sorted_by<T, K: Ord>(mut items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    items.sort_by_key(key);
    items
}

#[async_trait]
impl FolderStore for MemoryStore {
    async fn find_active(
        &self,
        user_id: UserId,
        folder_id: FolderId,
    ) -> AppResult<Option<Folder>> {
        let state = self.state.read().await;
        Ok(state.active_folder(user_id, folder_id).cloned())
    }

    async fn list_children(
        &self,
        user_id: UserId,
        parent_id: Option<FolderId>,
    ) -> AppResult<Vec<Folder>> {
        let state = self.state.read().await;
        let children = state
            .folders
            .values()
            .filter(|f| f.user_id == user_id && f.is_active && f.parent_id == parent_id)
            .cloned()
            .collect();
        Ok(sorted_by(children, |f: &Folder| f.name.clone()))
    }

    async fn list_active(&self, user_id: UserId) -> AppResult<Vec<Folder>> {
        let state = self.state.read().await;
        let folders = state
            .folders
            .values()
            .filter(|f| f.user_id == user_id && f.is_active)
            .cloned()
            .collect();
        Ok(sorted_by(folders, |f: &Folder| f.path.clone()))
    }

    async fn sibling_exists(
        &self,
        user_id: UserId,
        parent_id: Option<FolderId>,
        name: &str,
        exclude: Option<FolderId>,
    ) -> AppResult<bool> {
        let state = self.state.read().await;
        Ok(state.folder_sibling_exists(user_id, parent_id, name, exclude))
    }

    async fn insert(&self, data: &CreateFolder) -> AppResult<Folder> {
        let mut state = self.state.write().await;

        let parent_path = state.parent_path(data.user_id, data.parent_id)?;
        if state.folder_sibling_exists(data.user_id, data.parent_id, &data.name, None) {
            return Err(folder_conflict(&data.name));
        }

        let now = Utc::now();
        let folder = Folder {
            id: FolderId::new(),
            user_id: data.user_id,
            tenant_id: data.tenant_id,
            parent_id: data.parent_id,
            name: data.name.clone(),
            path: child_path(parent_path.as_deref(), &data.name),
            description: data.description.clone(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        state.folders.insert(folder.id, folder.clone());
        Ok(folder)
    }

    async fn relocate(&self, data: &RelocateFolder) -> AppResult<Folder> {
        let mut state = self.state.write().await;

        let old_path = state
            .active_folder(data.user_id, data.folder_id)
            .map(|f| f.path.clone())
            .ok_or_else(|| AppError::not_found(format!("Folder {} not found", data.folder_id)))?;

        if let Some(parent_id) = data.parent_id
            && state.is_ancestor_or_self(data.folder_id, parent_id)
        {
            return Err(AppError::invalid_input(
                "Cannot move a folder into itself or one of its descendants",
            ));
        }
        let parent_path = state.parent_path(data.user_id, data.parent_id)?;
        if state.folder_sibling_exists(data.user_id, data.parent_id, &data.name, Some(data.folder_id))
        {
            return Err(folder_conflict(&data.name));
        }

        let new_path = child_path(parent_path.as_deref(), &data.name);
        let now = Utc::now();

        if new_path != old_path {
            for id in state.descendants(data.folder_id) {
                if let Some(descendant) = state.folders.get_mut(&id)
                    && let Some(path) = rebase(&descendant.path, &old_path, &new_path)
                {
                    descendant.path = path;
                    descendant.updated_at = now;
                }
            }
        }

        let folder = state
            .folders
            .get_mut(&data.folder_id)
            .ok_or_else(|| AppError::inconsistent("Folder vanished during update"))?;
        folder.name = data.name.clone();
        folder.parent_id = data.parent_id;
        folder.path = new_path;
        folder.description = data.description.clone();
        folder.updated_at = now;
        Ok(folder.clone())
    }

    async fn deactivate_if_empty(
        &self,
        user_id: UserId,
        folder_id: FolderId,
    ) -> AppResult<Folder> {
        let mut state = self.state.write().await;

        if state.active_folder(user_id, folder_id).is_none() {
            return Err(AppError::not_found(format!("Folder {folder_id} not found")));
        }
        let contents = state.contents(user_id, folder_id);
        if contents.child_folders > 0 {
            return Err(AppError::conflict(
                "Cannot delete folder that contains subfolders",
            ));
        }
        if contents.files > 0 {
            return Err(AppError::conflict("Cannot delete folder that contains files"));
        }

        let folder = state
            .folders
            .get_mut(&folder_id)
            .ok_or_else(|| AppError::inconsistent("Folder vanished during delete"))?;
        folder.is_active = false;
        folder.updated_at = Utc::now();
        Ok(folder.clone())
    }
}

#[async_trait]
impl FileStore for MemoryStore {
    async fn find_active(&self, user_id: UserId, file_id: FileId) -> AppResult<Option<DriveFile>> {
        let state = self.state.read().await;
        Ok(state.active_file(user_id, file_id).cloned())
    }

    async fn list_in(
        &self,
        user_id: UserId,
        folder_id: Option<FolderId>,
    ) -> AppResult<Vec<DriveFile>> {
        let state = self.state.read().await;
        let files = state
            .files
            .values()
            .filter(|f| f.user_id == user_id && f.is_active() && f.folder_id == folder_id)
            .cloned()
            .collect();
        Ok(sorted_by(files, |f: &DriveFile| f.name.clone()))
    }

    async fn list_active(&self, user_id: UserId) -> AppResult<Vec<DriveFile>> {
        let state = self.state.read().await;
        let files = state
            .files
            .values()
            .filter(|f| f.user_id == user_id && f.is_active())
            .cloned()
            .collect();
        Ok(sorted_by(files, |f: &DriveFile| std::cmp::Reverse(f.created_at)))
    }

    async fn list_by_mime(&self, user_id: UserId, fragment: &str) -> AppResult<Vec<DriveFile>> {
        let needle = fragment.to_lowercase();
        let state = self.state.read().await;
        let files = state
            .files
            .values()
            .filter(|f| {
                f.user_id == user_id
                    && f.is_active()
                    && f.mime_type.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        Ok(sorted_by(files, |f: &DriveFile| std::cmp::Reverse(f.created_at)))
    }

    async fn name_taken(
        &self,
        user_id: UserId,
        folder_id: Option<FolderId>,
        name: &str,
        exclude: Option<FileId>,
    ) -> AppResult<bool> {
        let state = self.state.read().await;
        Ok(state.file_name_taken(user_id, folder_id, name, exclude))
    }

    async fn insert(&self, data: &CreateFile) -> AppResult<DriveFile> {
        let mut state = self.state.write().await;

        if let Some(folder_id) = data.folder_id
            && state.active_folder(data.user_id, folder_id).is_none()
        {
            return Err(AppError::not_found(format!("Folder {folder_id} not found")));
        }
        if state.file_name_taken(data.user_id, data.folder_id, &data.name, None) {
            return Err(file_conflict(&data.name));
        }

        let now = Utc::now();
        let file = DriveFile {
            id: FileId::new(),
            user_id: data.user_id,
            tenant_id: data.tenant_id,
            folder_id: data.folder_id,
            name: data.name.clone(),
            original_filename: data.original_filename.clone(),
            storage_path: data.storage_path.clone(),
            size_bytes: data.size_bytes,
            mime_type: data.mime_type.clone(),
            extension: data.extension.clone(),
            state: FileLifecycle::Active,
            download_count: 0,
            last_accessed_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        state.files.insert(file.id, file.clone());
        Ok(file)
    }

    async fn rename(&self, user_id: UserId, file_id: FileId, name: &str) -> AppResult<DriveFile> {
        let mut state = self.state.write().await;

        let folder_id = state
            .active_file(user_id, file_id)
            .map(|f| f.folder_id)
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;
        if state.file_name_taken(user_id, folder_id, name, Some(file_id)) {
            return Err(file_conflict(name));
        }

        let file = state
            .files
            .get_mut(&file_id)
            .ok_or_else(|| AppError::inconsistent("File vanished during rename"))?;
        file.name = name.to_string();
        file.updated_at = Utc::now();
        Ok(file.clone())
    }

    async fn mark_deleted(
        &self,
        user_id: UserId,
        file_id: FileId,
    ) -> AppResult<Option<DriveFile>> {
        let mut state = self.state.write().await;
        let Some(file) = state
            .files
            .get_mut(&file_id)
            .filter(|f| f.user_id == user_id && f.is_active())
        else {
            return Ok(None);
        };

        let now = Utc::now();
        file.state = FileLifecycle::Deleted;
        file.deleted_at = Some(now);
        file.updated_at = now;
        Ok(Some(file.clone()))
    }

    async fn record_access(
        &self,
        user_id: UserId,
        file_id: FileId,
        at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let mut state = self.state.write().await;
        match state
            .files
            .get_mut(&file_id)
            .filter(|f| f.user_id == user_id && f.is_active())
        {
            Some(file) => {
                file.download_count += 1;
                file.last_accessed_at = Some(at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn active_bytes(&self, user_id: UserId) -> AppResult<i64> {
        let state = self.state.read().await;
        Ok(state.active_bytes(user_id))
    }
}

#[async_trait]
impl QuotaStore for MemoryStore {
    async fn find(&self, user_id: UserId) -> AppResult<Option<QuotaRecord>> {
        let state = self.state.read().await;
        Ok(state.quotas.get(&user_id).cloned())
    }

    async fn insert_if_absent(&self, data: &CreateQuota) -> AppResult<QuotaRecord> {
        let mut state = self.state.write().await;
        let record = state.quotas.entry(data.user_id).or_insert_with(|| {
            let now = Utc::now();
            QuotaRecord {
                id: QuotaId::new(),
                user_id: data.user_id,
                tenant_id: data.tenant_id,
                max_bytes: data.max_bytes,
                used_bytes: data.used_bytes.max(0),
                created_at: now,
                updated_at: now,
            }
        });
        Ok(record.clone())
    }

    async fn try_charge(&self, user_id: UserId, bytes: i64) -> AppResult<Charge> {
        let mut state = self.state.write().await;
        let Some(record) = state.quotas.get_mut(&user_id) else {
            return Ok(Charge::NoRecord);
        };
        if !record.has_available(bytes) {
            return Ok(Charge::Insufficient(record.clone()));
        }
        record.used_bytes += bytes;
        record.updated_at = Utc::now();
        Ok(Charge::Applied(record.clone()))
    }

    async fn apply_delta(&self, user_id: UserId, delta: i64) -> AppResult<Option<QuotaRecord>> {
        let mut state = self.state.write().await;
        Ok(state.quotas.get_mut(&user_id).map(|record| {
            record.used_bytes = (record.used_bytes + delta).max(0);
            record.updated_at = Utc::now();
            record.clone()
        }))
    }

    async fn recompute(&self, user_id: UserId) -> AppResult<Option<Recomputed>> {
        let mut state = self.state.write().await;
        let actual = state.active_bytes(user_id);
        Ok(state.quotas.get_mut(&user_id).map(|record| {
            let previous_used = record.used_bytes;
            record.used_bytes = actual;
            record.updated_at = Utc::now();
            Recomputed {
                previous_used,
                record: record.clone(),
            }
        }))
    }

    async fn set_max(&self, user_id: UserId, max_bytes: i64) -> AppResult<Option<QuotaRecord>> {
        let mut state = self.state.write().await;
        Ok(state.quotas.get_mut(&user_id).map(|record| {
            record.max_bytes = max_bytes;
            record.updated_at = Utc::now();
            record.clone()
        }))
    }

    async fn list_all(&self) -> AppResult<Vec<QuotaRecord>> {
        let state = self.state.read().await;
        let records = state.quotas.values().cloned().collect();
        Ok(sorted_by(records, |r: &QuotaRecord| r.created_at))
    }

    async fn list_exceeding(&self) -> AppResult<Vec<QuotaRecord>> {
        let state = self.state.read().await;
        let records = state
            .quotas
            .values()
            .filter(|r| r.is_exceeded())
            .cloned()
            .collect();
        Ok(sorted_by(records, |r: &QuotaRecord| {
            std::cmp::Reverse(r.used_bytes - r.max_bytes)
        }))
    }

    async fn list_usage_above(&self, percentage: f64) -> AppResult<Vec<QuotaRecord>> {
        let state = self.state.read().await;
        let mut records: Vec<QuotaRecord> = state
            .quotas
            .values()
            .filter(|r| r.max_bytes > 0 && usage_percent(r) >= percentage)
            .cloned()
            .collect();
        records.sort_by(|a, b| usage_percent(b).total_cmp(&usage_percent(a)));
        Ok(records)
    }
}

fn usage_percent(record: &QuotaRecord) -> f64 {
    record.used_bytes as f64 * 100.0 / record.max_bytes as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use drive_core::error::ErrorKind;
    use drive_core::types::TenantId;

    fn new_folder(user_id: UserId, parent_id: Option<FolderId>, name: &str) -> CreateFolder {
        CreateFolder {
            user_id,
            tenant_id: TenantId::nil(),
            parent_id,
            name: name.to_string(),
            description: None,
        }
    }

    fn new_file(user_id: UserId, folder_id: Option<FolderId>, name: &str, size: i64) -> CreateFile {
        CreateFile {
            user_id,
            tenant_id: TenantId::nil(),
            folder_id,
            name: name.to_string(),
            original_filename: name.to_string(),
            storage_path: format!("blobs/{name}"),
            size_bytes: size,
            mime_type: "text/plain".to_string(),
            extension: None,
        }
    }

    async fn seed_quota(store: &MemoryStore, user_id: UserId, max: i64, used: i64) {
        store
            .insert_if_absent(&CreateQuota {
                user_id,
                tenant_id: TenantId::nil(),
                max_bytes: max,
                used_bytes: used,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_insert_materializes_nested_paths() {
        let store = MemoryStore::new();
        let user = UserId::new();
        let a = FolderStore::insert(&store, &new_folder(user, None, "A")).await.unwrap();
        let b = FolderStore::insert(&store, &new_folder(user, Some(a.id), "B")).await.unwrap();
        let c = FolderStore::insert(&store, &new_folder(user, Some(b.id), "C")).await.unwrap();
        assert_eq!(a.path, "/A");
        assert_eq!(c.path, "/A/B/C");
    }

    #[tokio::test]
    async fn test_sibling_names_are_unique_per_parent_and_user() {
        let store = MemoryStore::new();
        let user = UserId::new();
        let other = UserId::new();
        FolderStore::insert(&store, &new_folder(user, None, "Docs")).await.unwrap();

        let dup = FolderStore::insert(&store, &new_folder(user, None, "Docs")).await.unwrap_err();
        assert_eq!(dup.kind, ErrorKind::Conflict);

        // Case-sensitive, and scoped to the owner.
        FolderStore::insert(&store, &new_folder(user, None, "docs")).await.unwrap();
        FolderStore::insert(&store, &new_folder(other, None, "Docs")).await.unwrap();
    }

    #[tokio::test]
    async fn test_insert_under_foreign_parent_is_not_found() {
        let store = MemoryStore::new();
        let owner = UserId::new();
        let parent = FolderStore::insert(&store, &new_folder(owner, None, "Mine")).await.unwrap();

        let err = FolderStore::insert(&store, &new_folder(UserId::new(), Some(parent.id), "X"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_relocate_rewrites_descendant_paths() {
        let store = MemoryStore::new();
        let user = UserId::new();
        let a = FolderStore::insert(&store, &new_folder(user, None, "A")).await.unwrap();
        let b = FolderStore::insert(&store, &new_folder(user, Some(a.id), "B")).await.unwrap();
        let c = FolderStore::insert(&store, &new_folder(user, Some(b.id), "C")).await.unwrap();
        let ab = FolderStore::insert(&store, &new_folder(user, None, "AB")).await.unwrap();

        let renamed = store
            .relocate(&RelocateFolder {
                user_id: user,
                folder_id: a.id,
                name: "A2".to_string(),
                parent_id: None,
                description: None,
            })
            .await
            .unwrap();
        assert_eq!(renamed.path, "/A2");

        let c = FolderStore::find_active(&store, user, c.id).await.unwrap().unwrap();
        assert_eq!(c.path, "/A2/B/C");
        let ab = FolderStore::find_active(&store, user, ab.id).await.unwrap().unwrap();
        assert_eq!(ab.path, "/AB");
    }

    #[tokio::test]
    async fn test_relocate_into_descendant_is_rejected() {
        let store = MemoryStore::new();
        let user = UserId::new();
        let a = FolderStore::insert(&store, &new_folder(user, None, "A")).await.unwrap();
        let b = FolderStore::insert(&store, &new_folder(user, Some(a.id), "B")).await.unwrap();

        for target in [a.id, b.id] {
            let err = store
                .relocate(&RelocateFolder {
                    user_id: user,
                    folder_id: a.id,
                    name: "A".to_string(),
                    parent_id: Some(target),
                    description: None,
                })
                .await
                .unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidInput);
        }
    }

    #[tokio::test]
    async fn test_deactivate_requires_empty_folder() {
        let store = MemoryStore::new();
        let user = UserId::new();
        let a = FolderStore::insert(&store, &new_folder(user, None, "A")).await.unwrap();
        let file = FileStore::insert(&store, &new_file(user, Some(a.id), "x.txt", 5))
            .await
            .unwrap();

        let err = store.deactivate_if_empty(user, a.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert!(FolderStore::find_active(&store, user, a.id).await.unwrap().is_some());

        store.mark_deleted(user, file.id).await.unwrap();
        let gone = store.deactivate_if_empty(user, a.id).await.unwrap();
        assert!(!gone.is_active);
        assert!(FolderStore::find_active(&store, user, a.id).await.unwrap().is_none());

        // The name is free again once the folder is inactive.
        FolderStore::insert(&store, &new_folder(user, None, "A")).await.unwrap();
    }

    #[tokio::test]
    async fn test_mark_deleted_transitions_once() {
        let store = MemoryStore::new();
        let user = UserId::new();
        let file = FileStore::insert(&store, &new_file(user, None, "a.txt", 10)).await.unwrap();

        let deleted = store.mark_deleted(user, file.id).await.unwrap().unwrap();
        assert_eq!(deleted.state, FileLifecycle::Deleted);
        assert!(deleted.deleted_at.is_some());
        assert!(store.mark_deleted(user, file.id).await.unwrap().is_none());
        assert!(store.list_in(user, None).await.unwrap().is_empty());
        assert_eq!(store.active_bytes(user).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_try_charge_respects_capacity() {
        let store = MemoryStore::new();
        let user = UserId::new();
        assert_eq!(store.try_charge(user, 1).await.unwrap(), Charge::NoRecord);

        seed_quota(&store, user, 1000, 600).await;
        match store.try_charge(user, 500).await.unwrap() {
            Charge::Insufficient(record) => assert_eq!(record.used_bytes, 600),
            other => panic!("expected insufficient, got {other:?}"),
        }
        match store.try_charge(user, 400).await.unwrap() {
            Charge::Applied(record) => assert_eq!(record.used_bytes, 1000),
            other => panic!("expected applied, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_apply_delta_floors_at_zero() {
        let store = MemoryStore::new();
        let user = UserId::new();
        seed_quota(&store, user, 1000, 100).await;
        let record = store.apply_delta(user, -250).await.unwrap().unwrap();
        assert_eq!(record.used_bytes, 0);
    }

    #[tokio::test]
    async fn test_recompute_reports_previous_usage() {
        let store = MemoryStore::new();
        let user = UserId::new();
        seed_quota(&store, user, 1000, 0).await;
        FileStore::insert(&store, &new_file(user, None, "a.txt", 300)).await.unwrap();
        store.force_used_bytes(user, 999).await;

        let outcome = store.recompute(user).await.unwrap().unwrap();
        assert_eq!(outcome.previous_used, 999);
        assert_eq!(outcome.record.used_bytes, 300);
    }

    #[tokio::test]
    async fn test_usage_reports() {
        let store = MemoryStore::new();
        let (low, high, over) = (UserId::new(), UserId::new(), UserId::new());
        seed_quota(&store, low, 1000, 100).await;
        seed_quota(&store, high, 1000, 900).await;
        seed_quota(&store, over, 1000, 0).await;
        store.force_used_bytes(over, 1500).await;

        let above: Vec<UserId> = store
            .list_usage_above(80.0)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.user_id)
            .collect();
        assert_eq!(above, vec![over, high]);

        let exceeding = store.list_exceeding().await.unwrap();
        assert_eq!(exceeding.len(), 1);
        assert_eq!(exceeding[0].user_id, over);
    }

    #[tokio::test]
    async fn test_concurrent_inserts_admit_one_name() {
        let store = MemoryStore::new();
        let user = UserId::new();
        let attempts = (0..16).map(|_| {
            let store = store.clone();
            tokio::spawn(async move {
                FolderStore::insert(&store, &new_folder(user, None, "Same")).await
            })
        });
        let results = futures::future::join_all(attempts).await;
        let successes = results
            .into_iter()
            .filter(|r| matches!(r, Ok(Ok(_))))
            .count();
        assert_eq!(successes, 1);
    }
}
