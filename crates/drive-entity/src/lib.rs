//! # drive-entity
//!
//! Entity models for the personal drive. Every struct in this crate is
//! either a database row (`Folder`, `DriveFile`, `QuotaRecord`, deriving
//! `sqlx::FromRow`) or a value object computed from one.

pub mod file;
pub mod folder;
pub mod naming;
pub mod quota;
