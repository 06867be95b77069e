//! Scenario: a failed pass leaves the instance in its last good state
//!
//! # Invariants under test
//!
//! 1. HTTP 500 on create surfaces a protocol error with status 500; the
//!    failing pass performs no follow-up summary fetch to patch over it.
//! 2. The instance keeps the observed state from its last successful pass;
//!    a never-reconciled instance stays uninitialized.
//! 3. A failed summary fetch (including a decode failure) stops the pass
//!    before any delta computation: no create call happens.

use sapling_ledger::LedgerError;
use sapling_reconcile::{Cadence, ObservedState};
use sapling_runtime::{InstancePhase, ResourceInstance};
use sapling_testkit::{FakeLedger, InjectedFailure};

#[test]
fn http_500_on_create_surfaces_and_skips_refetch() {
    let fake = FakeLedger::with_state(40, 20);
    let mut inst = ResourceInstance::new(100, Cadence::OneTime);

    fake.fail_next_create(InjectedFailure::Protocol {
        status: 500,
        body: "internal ledger failure".to_string(),
    });

    let err = inst.create(&fake).unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(
        fake.fetch_calls(),
        1,
        "a failed create must not be followed by a refetch"
    );
    assert_eq!(inst.phase(), InstancePhase::Uninitialized);
    assert!(inst.last_observed().is_none());
}

#[test]
fn failure_keeps_the_last_successfully_observed_state() {
    let fake = FakeLedger::new();
    let mut inst = ResourceInstance::new(40, Cadence::OneTime);

    inst.create(&fake).unwrap();
    let good = inst.last_observed().unwrap();
    assert_eq!(good, ObservedState::new(0, 40));

    fake.fail_next_create(InjectedFailure::Protocol {
        status: 503,
        body: "try later".to_string(),
    });
    assert!(inst.update(&fake, 100, Cadence::OneTime).is_err());

    // Still reconciled against the previous pass; nothing was clobbered.
    assert_eq!(inst.phase(), InstancePhase::Reconciled);
    assert_eq!(inst.last_observed(), Some(good));
}

#[test]
fn malformed_summary_stops_the_pass_before_any_delta() {
    let fake = FakeLedger::with_state(40, 20);
    let mut inst = ResourceInstance::new(100, Cadence::OneTime);

    fake.fail_next_fetch(InjectedFailure::Decode(
        "expected value at line 1 column 1".to_string(),
    ));

    let err = inst.create(&fake).unwrap_err();

    assert!(matches!(err, LedgerError::Decode(_)));
    assert_eq!(fake.create_calls(), 0, "no delta may be applied blind");
}

#[test]
fn transport_failure_on_fetch_is_retryable() {
    let fake = FakeLedger::new();
    let mut inst = ResourceInstance::new(10, Cadence::PerMonth);

    fake.fail_next_fetch(InjectedFailure::Transport("connection reset".to_string()));
    let err = inst.create(&fake).unwrap_err();
    assert!(err.is_retryable());

    // Re-driving the pass succeeds.
    assert_eq!(inst.create(&fake).unwrap().delta, 10);
}
