//! # drive-service
//!
//! Business logic for the personal drive. Three components own the state
//! rules and the [`DriveFacade`] composes them into caller-facing operations:
//!
//! - [`QuotaLedger`]: per-user running total of bytes against a capacity.
//! - [`NamespaceTree`]: folders, their materialized paths, and sibling-name
//!   uniqueness.
//! - [`FileRegistry`]: file records and their lifecycle.
//!
//! Services follow constructor injection; every operation takes an explicit
//! [`RequestContext`] naming the acting user.

pub mod context;
pub mod facade;
pub mod file;
pub mod folder;
pub mod quota;

pub use context::RequestContext;
pub use facade::{DriveFacade, FolderDetails};
pub use file::{CreateFileRequest, FileRegistry};
pub use folder::{CreateFolderRequest, NamespaceTree, UpdateFolderRequest};
pub use quota::{QuotaDrift, QuotaLedger, ReconcileReport};
