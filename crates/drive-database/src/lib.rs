//! # drive-database
//!
//! Persistence for the personal drive. The service layer talks to the
//! [`FolderStore`], [`FileStore`], and [`QuotaStore`] traits; this crate
//! provides a PostgreSQL implementation (one repository per table) and a
//! process-local [`MemoryStore`] with the same atomicity guarantees.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use store::{Charge, FileStore, FolderStore, QuotaStore, Recomputed, Stores};
