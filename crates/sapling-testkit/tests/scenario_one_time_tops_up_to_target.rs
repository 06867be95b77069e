//! Scenario: one-time target tops up to the lifetime total
//!
//! # Invariants under test
//!
//! 1. First pass against a ledger already holding billed=40/unbilled=20
//!    with a one-time target of 100 plants exactly the 40-tree shortfall.
//! 2. The outcome carries the refetched observed state (the ledger after
//!    the plant), which the host persists.
//! 3. A second pass is a clean no-op: no further create call is made.

use sapling_reconcile::{Cadence, ObservedState};
use sapling_runtime::{InstancePhase, ResourceInstance};
use sapling_testkit::FakeLedger;

#[test]
fn one_time_first_pass_plants_the_shortfall() {
    let fake = FakeLedger::with_state(40, 20);
    let mut inst = ResourceInstance::new(100, Cadence::OneTime);

    let outcome = inst.create(&fake).unwrap();

    assert_eq!(outcome.delta, 40);
    assert_eq!(outcome.record.as_ref().unwrap().quantity, 40);
    assert_eq!(outcome.observed, ObservedState::new(40, 60));
    assert_eq!(inst.phase(), InstancePhase::Reconciled);
    assert_eq!(inst.last_observed(), Some(ObservedState::new(40, 60)));
}

#[test]
fn one_time_second_pass_is_a_noop() {
    let fake = FakeLedger::with_state(40, 20);
    let mut inst = ResourceInstance::new(100, Cadence::OneTime);

    inst.create(&fake).unwrap();
    let second = inst.refresh(&fake).unwrap();

    assert!(second.is_noop());
    assert!(second.record.is_none());
    assert_eq!(fake.create_calls(), 1, "no-op pass must not touch the wire");
    assert_eq!(fake.planted_total(), 100);
}

#[test]
fn one_time_raising_the_target_plants_only_the_difference() {
    let fake = FakeLedger::new();
    let mut inst = ResourceInstance::new(100, Cadence::OneTime);
    inst.create(&fake).unwrap();

    // Same instance key, different quantity: a new logical event, not a retry.
    let outcome = inst.update(&fake, 150, Cadence::OneTime).unwrap();

    assert_eq!(outcome.delta, 50);
    assert_eq!(fake.planted_total(), 150);
}
