//! Reconciliation of external customer records against the internal store:
//! match resolution, conflict validation, field merging, and duplicate
//! coordination, orchestrated as one strictly ordered sync flow.

pub mod duplicates;
pub mod resolver;
pub mod sync;

pub use resolver::resolve;
pub use sync::{ReconciliationEngine, SyncError};
