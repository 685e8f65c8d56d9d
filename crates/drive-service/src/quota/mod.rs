//! Storage quota accounting.

pub mod ledger;

pub use ledger::{QuotaDrift, QuotaLedger, ReconcileReport};
