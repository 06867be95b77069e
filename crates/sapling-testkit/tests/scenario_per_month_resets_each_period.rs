//! Scenario: per-month target resets with the billing cycle
//!
//! # Invariants under test
//!
//! 1. Only the unbilled counter reduces a per-month target; billed history
//!    from prior periods is ignored no matter how large.
//! 2. Once unbilled covers the target, further passes in the same period
//!    are no-ops.
//! 3. After an invoicing run (unbilled -> billed), the next pass plants the
//!    full target again.

use sapling_reconcile::{Cadence, ObservedState};
use sapling_runtime::ResourceInstance;
use sapling_testkit::FakeLedger;

#[test]
fn per_month_ignores_billed_history() {
    let fake = FakeLedger::with_state(1000, 10);
    let mut inst = ResourceInstance::new(50, Cadence::PerMonth);

    let outcome = inst.create(&fake).unwrap();

    assert_eq!(outcome.delta, 40);
    assert_eq!(outcome.observed, ObservedState::new(1000, 50));
}

#[test]
fn per_month_is_noop_once_unbilled_covers_target() {
    let fake = FakeLedger::with_state(0, 75);
    let mut inst = ResourceInstance::new(50, Cadence::PerMonth);

    let outcome = inst.create(&fake).unwrap();

    assert!(outcome.is_noop());
    assert_eq!(fake.create_calls(), 0);
}

#[test]
fn per_month_plants_again_after_invoicing() {
    let fake = FakeLedger::new();
    let mut inst = ResourceInstance::new(50, Cadence::PerMonth);

    assert_eq!(inst.create(&fake).unwrap().delta, 50);

    // The invoicing run closes the period; the remote's idempotency window
    // has long lapsed by the next reconciliation.
    fake.bill_cycle();
    fake.expire_idempotency_window();

    let next = inst.refresh(&fake).unwrap();
    assert_eq!(next.delta, 50);
    assert_eq!(next.observed, ObservedState::new(50, 50));
}
