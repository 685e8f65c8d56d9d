//! Folder domain entities.

pub mod model;
pub mod path;
pub mod tree;

pub use model::{CreateFolder, Folder, RelocateFolder};
pub use tree::FolderNode;
