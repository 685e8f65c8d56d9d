//! Folder namespace management.

pub mod service;
pub mod tree;

pub use service::{CreateFolderRequest, NamespaceTree, UpdateFolderRequest};
