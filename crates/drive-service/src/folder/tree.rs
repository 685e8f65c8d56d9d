//! Folder tree building.

use std::collections::HashMap;

use drive_core::types::FolderId;
use drive_entity::file::DriveFile;
use drive_entity::folder::{Folder, FolderNode};

/// Build nested nodes from flat folder and file lists.
///
/// With `root` set the result holds that folder's subtree only; otherwise it
/// holds every root-level folder. Children are ordered by name.
pub fn build_forest(
    folders: &[Folder],
    files: &[DriveFile],
    root: Option<FolderId>,
) -> Vec<FolderNode> {
    let mut file_counts: HashMap<FolderId, u64> = HashMap::new();
    for folder_id in files.iter().filter(|f| f.is_active()).filter_map(|f| f.folder_id) {
        *file_counts.entry(folder_id).or_default() += 1;
    }

    let mut children: HashMap<Option<FolderId>, Vec<&Folder>> = HashMap::new();
    for folder in folders.iter().filter(|f| f.is_active) {
        children.entry(folder.parent_id).or_default().push(folder);
    }
    for siblings in children.values_mut() {
        siblings.sort_by(|a, b| a.name.cmp(&b.name));
    }

    match root {
        Some(root_id) => folders
            .iter()
            .find(|f| f.id == root_id && f.is_active)
            .map(|f| vec![build_node(f, &children, &file_counts, 0)])
            .unwrap_or_default(),
        None => children
            .get(&None)
            .map(|roots| {
                roots
                    .iter()
                    .map(|f| build_node(f, &children, &file_counts, 0))
                    .collect()
            })
            .unwrap_or_default(),
    }
}

fn build_node(
    folder: &Folder,
    children: &HashMap<Option<FolderId>, Vec<&Folder>>,
    file_counts: &HashMap<FolderId, u64>,
    depth: usize,
) -> FolderNode {
    // Stored data with a parent cycle would otherwise recurse forever.
    let nested = if depth > children.values().map(Vec::len).sum::<usize>() {
        Vec::new()
    } else {
        children
            .get(&Some(folder.id))
            .map(|kids| {
                kids.iter()
                    .map(|child| build_node(child, children, file_counts, depth + 1))
                    .collect()
            })
            .unwrap_or_default()
    };

    FolderNode {
        id: folder.id,
        name: folder.name.clone(),
        path: folder.path.clone(),
        file_count: file_counts.get(&folder.id).copied().unwrap_or(0),
        children: nested,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use drive_core::types::{FileId, TenantId, UserId};
    use drive_entity::file::FileLifecycle;

    fn folder(name: &str, parent: Option<&Folder>) -> Folder {
        let now = Utc::now();
        Folder {
            id: FolderId::new(),
            user_id: UserId::nil(),
            tenant_id: TenantId::nil(),
            parent_id: parent.map(|p| p.id),
            name: name.to_string(),
            path: drive_entity::folder::path::child_path(parent.map(|p| p.path.as_str()), name),
            description: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn file_in(folder: &Folder, state: FileLifecycle) -> DriveFile {
        let now = Utc::now();
        DriveFile {
            id: FileId::new(),
            user_id: UserId::nil(),
            tenant_id: TenantId::nil(),
            folder_id: Some(folder.id),
            name: "f".into(),
            original_filename: "f".into(),
            storage_path: "p".into(),
            size_bytes: 1,
            mime_type: "text/plain".into(),
            extension: None,
            state,
            download_count: 0,
            last_accessed_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn test_forest_nests_and_sorts() {
        let docs = folder("Docs", None);
        let art = folder("Art", None);
        let zeta = folder("Zeta", Some(&docs));
        let alpha = folder("Alpha", Some(&docs));
        let files = vec![
            file_in(&docs, FileLifecycle::Active),
            file_in(&docs, FileLifecycle::Deleted),
            file_in(&alpha, FileLifecycle::Active),
        ];

        let forest = build_forest(&[docs.clone(), art, zeta, alpha], &files, None);
        let names: Vec<&str> = forest.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["Art", "Docs"]);

        let docs_node = &forest[1];
        assert_eq!(docs_node.file_count, 1);
        assert_eq!(docs_node.children.len(), 2);
        assert_eq!(docs_node.children[0].name, "Alpha");
        assert_eq!(docs_node.children[0].file_count, 1);
    }

    #[test]
    fn test_forest_from_subtree_root() {
        let docs = folder("Docs", None);
        let sub = folder("Sub", Some(&docs));
        let forest = build_forest(&[docs, sub.clone()], &[], Some(sub.id));
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].path, "/Docs/Sub");
        assert!(forest[0].children.is_empty());
    }
}
