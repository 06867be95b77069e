//! sapling-reconcile
//!
//! Reconciliation engine for declarative tree planting.
//!
//! Architectural decisions:
//! - Delta computation is a pure function of desired + observed state
//! - Cadence decides how ledger history counts against the target
//! - Zero desired quantity always yields a zero delta
//! - Contract violations (negative quantities) are rejected up front,
//!   never clamped
//!
//! Deterministic, pure logic. No IO. No ledger calls.

mod engine;
mod types;

pub use engine::{reconcile, reconcile_checked};
pub use types::*;
