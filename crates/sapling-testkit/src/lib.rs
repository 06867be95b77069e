//! sapling-testkit
//!
//! Deterministic in-memory fake ledger for scenario tests. No randomness,
//! no network I/O.

mod fake_ledger;

pub use fake_ledger::{FakeLedger, InjectedFailure};
