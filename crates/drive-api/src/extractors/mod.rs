//! Custom Axum extractors.

pub mod acting_user;
pub mod params;
pub mod validated;

pub use acting_user::{ActingUser, TENANT_ID_HEADER, USER_ID_HEADER};
pub use params::{ValidatedPath, ValidatedQuery};
pub use validated::ValidatedJson;
