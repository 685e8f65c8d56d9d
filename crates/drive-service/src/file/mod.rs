//! File record management.

pub mod registry;

pub use registry::{CreateFileRequest, DEFAULT_MIME_TYPE, FileRegistry};
