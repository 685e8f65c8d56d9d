//! PostgreSQL repositories, one per drive table.

pub mod file;
pub mod folder;
pub mod quota;

pub use file::FileRepository;
pub use folder::FolderRepository;
pub use quota::QuotaRepository;

use drive_core::error::{AppError, ErrorKind};

/// Whether `err` is a unique violation on the named index or constraint.
pub(crate) fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.is_unique_violation() && db_err.constraint() == Some(constraint)
        }
        _ => false,
    }
}

/// Wrap a sqlx error as a database failure with context.
pub(crate) fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, context, e)
}
