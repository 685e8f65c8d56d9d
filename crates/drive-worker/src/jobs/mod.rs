//! Built-in scheduled jobs.

pub mod reconcile;

pub use reconcile::QuotaReconcileJob;
