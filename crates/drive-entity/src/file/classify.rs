//! Presentation helpers derived from file metadata.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit prefixes for [`format_size`], starting at kibibytes.
const SIZE_PREFIXES: [char; 6] = ['K', 'M', 'G', 'T', 'P', 'E'];

/// Lowercased extension of `filename`.
///
/// A dot in the first or last position does not start an extension, so
/// `.bashrc` and `notes.` have none.
pub fn derive_extension(filename: &str) -> Option<String> {
    let dot = filename.rfind('.')?;
    if dot == 0 || dot + 1 >= filename.len() {
        return None;
    }
    Some(filename[dot + 1..].to_lowercase())
}

/// Format a byte count using binary units with one decimal, e.g. `"2.0 KB"`.
///
/// Counts below 1024 are printed exactly (`"512 B"`).
pub fn format_size(bytes: i64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut exp = 0;
    while value >= 1024.0 && exp < SIZE_PREFIXES.len() {
        value /= 1024.0;
        exp += 1;
    }
    format!("{value:.1} {}B", SIZE_PREFIXES[exp - 1])
}

/// Coarse file category shown next to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileCategory {
    Image,
    Video,
    Audio,
    #[serde(rename = "PDF")]
    Pdf,
    Spreadsheet,
    Presentation,
    Document,
    Text,
    Archive,
    File,
    Unknown,
}

impl FileCategory {
    /// Classify a MIME type.
    pub fn from_mime(mime: &str) -> Self {
        let mime = mime.trim().to_ascii_lowercase();
        if mime.is_empty() {
            return Self::Unknown;
        }
        if mime.starts_with("image/") {
            Self::Image
        } else if mime.starts_with("video/") {
            Self::Video
        } else if mime.starts_with("audio/") {
            Self::Audio
        } else if mime == "application/pdf" {
            Self::Pdf
        } else if mime.contains("excel") || mime.contains("spreadsheet") {
            Self::Spreadsheet
        } else if mime.contains("powerpoint") || mime.contains("presentation") {
            Self::Presentation
        } else if mime.contains("word") || mime.contains("document") {
            Self::Document
        } else if mime.starts_with("text/") {
            Self::Text
        } else if mime.contains("zip") || mime.contains("rar") || mime.contains("archive") {
            Self::Archive
        } else {
            Self::File
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Image => "Image",
            Self::Video => "Video",
            Self::Audio => "Audio",
            Self::Pdf => "PDF",
            Self::Spreadsheet => "Spreadsheet",
            Self::Presentation => "Presentation",
            Self::Document => "Document",
            Self::Text => "Text",
            Self::Archive => "Archive",
            Self::File => "File",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
