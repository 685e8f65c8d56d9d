//! Scheduled maintenance for the personal drive.
//!
//! The request path never recomputes quota usage; this crate runs the
//! periodic reconciliation that corrects drift between each user's running
//! total and the files it describes.

pub mod jobs;
pub mod scheduler;

pub use jobs::QuotaReconcileJob;
pub use scheduler::CronScheduler;
