//! Request DTOs with validation.

use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use drive_core::types::FolderId;
use drive_service::{CreateFileRequest, CreateFolderRequest, UpdateFolderRequest};

/// Create folder request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderBody {
    /// Folder name.
    #[validate(length(min = 1, max = 255, message = "Folder name is required"))]
    pub name: String,
    /// Parent folder (absent for root level).
    pub parent_id: Option<FolderId>,
    /// Optional description.
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

impl From<CreateFolderBody> for CreateFolderRequest {
    fn from(body: CreateFolderBody) -> Self {
        Self {
            name: body.name,
            parent_id: body.parent_id,
            description: body.description,
        }
    }
}

/// Rename and/or move folder request.
///
/// An absent `parentId` keeps the current parent; an explicit `null` moves
/// the folder to the root level.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFolderBody {
    /// New name.
    #[validate(length(min = 1, max = 255, message = "Folder name is required"))]
    pub name: String,
    /// Target parent.
    #[serde(default, deserialize_with = "double_option")]
    pub parent_id: Option<Option<FolderId>>,
    /// Replacement description; blank clears it.
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

impl From<UpdateFolderBody> for UpdateFolderRequest {
    fn from(body: UpdateFolderBody) -> Self {
        Self {
            name: body.name,
            parent_id: body.parent_id,
            description: body.description,
        }
    }
}

/// Register file request. The bytes are already in the blob store.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFileBody {
    /// Containing folder (absent for root level).
    pub folder_id: Option<FolderId>,
    /// Display name.
    #[validate(length(min = 1, max = 255, message = "File name is required"))]
    pub name: String,
    /// Name on the uploader's machine.
    pub original_filename: Option<String>,
    /// Blob store reference.
    #[validate(length(min = 1, message = "Storage path is required"))]
    pub storage_path: String,
    /// Content size in bytes.
    #[validate(range(min = 0, message = "File size cannot be negative"))]
    pub size_bytes: Option<i64>,
    /// MIME type.
    pub mime_type: Option<String>,
    /// Extension override.
    pub extension: Option<String>,
}

impl From<CreateFileBody> for CreateFileRequest {
    fn from(body: CreateFileBody) -> Self {
        Self {
            folder_id: body.folder_id,
            name: body.name,
            original_filename: body.original_filename,
            storage_path: body.storage_path,
            size_bytes: body.size_bytes,
            mime_type: body.mime_type,
            extension: body.extension,
        }
    }
}

/// Rename file request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RenameFileBody {
    /// New display name.
    #[validate(length(min = 1, max = 255, message = "File name is required"))]
    pub name: String,
}

/// `?folderId=` query; absent means the root level.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderQuery {
    /// Folder to list.
    pub folder_id: Option<FolderId>,
}

/// Distinguish an absent field (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_id_absent_null_and_set() {
        let absent: UpdateFolderBody = serde_json::from_str(r#"{"name":"A"}"#).unwrap();
        assert_eq!(absent.parent_id, None);

        let null: UpdateFolderBody =
            serde_json::from_str(r#"{"name":"A","parentId":null}"#).unwrap();
        assert_eq!(null.parent_id, Some(None));

        let id = FolderId::new();
        let set: UpdateFolderBody =
            serde_json::from_str(&format!(r#"{{"name":"A","parentId":"{id}"}}"#)).unwrap();
        assert_eq!(set.parent_id, Some(Some(id)));
    }

    #[test]
    fn test_create_file_validation() {
        let body: CreateFileBody = serde_json::from_str(
            r#"{"name":"a.txt","storagePath":"blobs/a","sizeBytes":-5}"#,
        )
        .unwrap();
        assert!(body.validate().is_err());

        let body: CreateFileBody =
            serde_json::from_str(r#"{"name":"a.txt","storagePath":"blobs/a","sizeBytes":5}"#)
                .unwrap();
        assert!(body.validate().is_ok());
    }
}
