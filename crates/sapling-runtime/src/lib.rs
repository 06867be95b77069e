//! sapling-runtime
//!
//! Orchestration driver that composes the reconciliation engine with the
//! ledger client.
//!
//! Control flow per pass: fetch the current summary, compute the delta,
//! apply it as a usage record only when strictly positive, then refetch the
//! summary to produce the observed state the host persists. Scheduling of
//! passes and persistence of the resulting state stay with the host; each
//! resource instance is single-writer.

mod driver;
mod instance;

pub use driver::{reconcile_once, ReconcileOutcome};
pub use instance::{InstancePhase, ResourceInstance};
