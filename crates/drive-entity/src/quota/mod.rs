//! Storage quota entities.

pub mod model;
pub mod snapshot;

pub use model::{CreateQuota, QuotaRecord};
pub use snapshot::QuotaSnapshot;
