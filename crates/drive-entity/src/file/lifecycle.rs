//! File lifecycle state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a file record sits in its lifecycle.
///
/// The only transition is `Active -> Deleted`. Deleted records are kept
/// for history but never counted against quota or returned by reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "drive_file_state", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FileLifecycle {
    /// Visible and counted toward the owner's usage.
    Active,
    /// Soft-deleted.
    Deleted,
}

impl FileLifecycle {
    /// Whether the file is visible to reads.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Return the state as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for FileLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FileLifecycle {
    type Err = drive_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "deleted" => Ok(Self::Deleted),
            _ => Err(drive_core::AppError::invalid_input(format!(
                "Invalid file state: '{s}'. Expected one of: active, deleted"
            ))),
        }
    }
}
