//! File domain entities.

pub mod classify;
pub mod lifecycle;
pub mod model;

pub use classify::{FileCategory, derive_extension, format_size};
pub use lifecycle::FileLifecycle;
pub use model::{CreateFile, DriveFile};
