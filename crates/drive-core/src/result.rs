//! Convenience result type alias for the drive.

use crate::error::AppError;

/// A specialized `Result` type for drive operations.
pub type AppResult<T> = Result<T, AppError>;
