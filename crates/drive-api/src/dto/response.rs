//! Response DTOs.

use serde::{Deserialize, Serialize};

use drive_core::types::FileId;
use drive_entity::file::{DriveFile, FileCategory};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message.
    pub message: String,
}

impl MessageResponse {
    /// Creates a message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A file record with display helpers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResponse {
    /// The stored record.
    #[serde(flatten)]
    pub file: DriveFile,
    /// Human-readable size.
    pub size_formatted: String,
    /// Category derived from the MIME type.
    pub category: FileCategory,
}

impl From<DriveFile> for FileResponse {
    fn from(file: DriveFile) -> Self {
        Self {
            size_formatted: file.size_formatted(),
            category: file.category(),
            file,
        }
    }
}

/// Where to fetch a file's bytes from the blob store.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResponse {
    /// File ID.
    pub file_id: FileId,
    /// Suggested download name.
    pub filename: String,
    /// Blob store reference.
    pub storage_path: String,
    /// MIME type.
    pub mime_type: String,
    /// Size in bytes.
    pub size_bytes: i64,
}

impl From<DriveFile> for DownloadResponse {
    fn from(file: DriveFile) -> Self {
        Self {
            file_id: file.id,
            filename: file.original_filename,
            storage_path: file.storage_path,
            mime_type: file.mime_type,
            size_bytes: file.size_bytes,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Store backend in use.
    pub backend: String,
    /// Store status.
    pub database: String,
}
