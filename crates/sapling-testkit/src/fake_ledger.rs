use sapling_ledger::{LedgerClient, LedgerError, UsageRecord};
use sapling_reconcile::ObservedState;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// A failure the fake returns instead of serving the next call.
#[derive(Clone, Debug)]
pub enum InjectedFailure {
    Transport(String),
    Protocol { status: u16, body: String },
    Decode(String),
}

impl InjectedFailure {
    fn into_error(self) -> LedgerError {
        match self {
            InjectedFailure::Transport(msg) => LedgerError::Transport(msg),
            InjectedFailure::Protocol { status, body } => LedgerError::Protocol { status, body },
            InjectedFailure::Decode(msg) => LedgerError::Decode(msg),
        }
    }
}

#[derive(Default)]
struct Inner {
    billed: i64,
    unbilled: i64,
    next_record_id: u64,
    /// Active idempotency window: key -> acknowledged record. A create whose
    /// key is present here replays the stored record without planting.
    window: BTreeMap<String, UsageRecord>,
    create_calls: u64,
    replayed_creates: u64,
    fetch_calls: u64,
    fail_next_create: Option<InjectedFailure>,
    /// Plant and record the key, but lose the response in flight.
    fail_next_create_after_commit: bool,
    fail_next_fetch: Option<InjectedFailure>,
}

/// Deterministic fake planting ledger.
///
/// Models the remote service's side of the contract:
/// - every created record lands in the unbilled counter
/// - at-most-once per (idempotency key, quantity) within the active window:
///   a replay returns the original record and plants nothing; the same key
///   with a different quantity is a new logical event
/// - [`FakeLedger::expire_idempotency_window`] models the remote's
///   time-based window lapsing between genuinely distinct events
/// - [`FakeLedger::bill_cycle`] models the invoicing run that moves
///   unbilled trees to billed
///
/// Interior mutability via `Mutex` because [`LedgerClient`] takes `&self`.
#[derive(Default)]
pub struct FakeLedger {
    inner: Mutex<Inner>,
}

impl FakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(billed: i64, unbilled: i64) -> Self {
        let fake = Self::new();
        {
            let mut inner = fake.inner.lock().unwrap();
            inner.billed = billed;
            inner.unbilled = unbilled;
        }
        fake
    }

    /// Next `create_usage_record` fails without planting anything.
    pub fn fail_next_create(&self, failure: InjectedFailure) {
        self.inner.lock().unwrap().fail_next_create = Some(failure);
    }

    /// Next `create_usage_record` plants and records the key, but the
    /// response is lost in flight, so the caller sees a transport error.
    /// The retry case this exists for: the same key must replay, never
    /// double-plant.
    pub fn fail_next_create_after_commit(&self) {
        self.inner.lock().unwrap().fail_next_create_after_commit = true;
    }

    /// Next `fetch_summary` fails.
    pub fn fail_next_fetch(&self, failure: InjectedFailure) {
        self.inner.lock().unwrap().fail_next_fetch = Some(failure);
    }

    /// Invoicing run: all unbilled trees become billed.
    pub fn bill_cycle(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.billed += inner.unbilled;
        inner.unbilled = 0;
    }

    /// The remote's dedupe window lapses; previously seen keys are forgotten.
    pub fn expire_idempotency_window(&self) {
        self.inner.lock().unwrap().window.clear();
    }

    /// Wire-level create calls, replays included.
    pub fn create_calls(&self) -> u64 {
        self.inner.lock().unwrap().create_calls
    }

    /// Creates answered from the idempotency window without planting.
    pub fn replayed_creates(&self) -> u64 {
        self.inner.lock().unwrap().replayed_creates
    }

    pub fn fetch_calls(&self) -> u64 {
        self.inner.lock().unwrap().fetch_calls
    }

    /// Current remote truth, without counting as a fetch.
    pub fn state(&self) -> ObservedState {
        let inner = self.inner.lock().unwrap();
        ObservedState::new(inner.billed, inner.unbilled)
    }

    pub fn planted_total(&self) -> i64 {
        self.state().lifetime_total()
    }
}

impl LedgerClient for FakeLedger {
    fn create_usage_record(
        &self,
        quantity: i64,
        idempotency_key: &str,
    ) -> Result<UsageRecord, LedgerError> {
        let mut inner = self.inner.lock().unwrap();
        inner.create_calls += 1;

        if let Some(failure) = inner.fail_next_create.take() {
            return Err(failure.into_error());
        }

        // Remote-side validation mirror.
        if quantity <= 0 {
            return Err(LedgerError::Protocol {
                status: 422,
                body: format!("quantity must be positive, got {quantity}"),
            });
        }

        // Idempotent replay: the same key with the same quantity within the
        // window is a retry of the same logical mutation and never
        // double-plants. The same key with a different quantity is a new
        // logical event and supersedes the window entry.
        if let Some(existing) = inner.window.get(idempotency_key).cloned() {
            if existing.quantity == quantity {
                inner.replayed_creates += 1;
                return Ok(existing);
            }
        }

        inner.next_record_id += 1;
        let record = UsageRecord {
            id: format!("ur-{:04}", inner.next_record_id),
            quantity,
            payment_profile_id: "pp-test".to_string(),
            created_at: 1_700_000_000 + inner.next_record_id as i64,
        };

        inner.unbilled += quantity;
        inner
            .window
            .insert(idempotency_key.to_string(), record.clone());

        if inner.fail_next_create_after_commit {
            inner.fail_next_create_after_commit = false;
            return Err(LedgerError::Transport(
                "response lost after commit".to_string(),
            ));
        }

        Ok(record)
    }

    fn fetch_summary(&self) -> Result<ObservedState, LedgerError> {
        let mut inner = self.inner.lock().unwrap();
        inner.fetch_calls += 1;

        if let Some(failure) = inner.fail_next_fetch.take() {
            return Err(failure.into_error());
        }

        Ok(ObservedState::new(inner.billed, inner.unbilled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_plants_into_unbilled() {
        let fake = FakeLedger::new();
        fake.create_usage_record(40, "k1").unwrap();
        assert_eq!(fake.state(), ObservedState::new(0, 40));
    }

    #[test]
    fn replay_within_window_plants_nothing() {
        let fake = FakeLedger::new();
        let first = fake.create_usage_record(40, "k1").unwrap();
        let replay = fake.create_usage_record(40, "k1").unwrap();
        assert_eq!(first, replay);
        assert_eq!(fake.planted_total(), 40);
        assert_eq!(fake.replayed_creates(), 1);
    }

    #[test]
    fn expired_window_allows_a_new_event() {
        let fake = FakeLedger::new();
        fake.create_usage_record(5, "k1").unwrap();
        fake.expire_idempotency_window();
        fake.create_usage_record(5, "k1").unwrap();
        assert_eq!(fake.planted_total(), 10);
    }

    #[test]
    fn bill_cycle_moves_unbilled_to_billed() {
        let fake = FakeLedger::with_state(10, 30);
        fake.bill_cycle();
        assert_eq!(fake.state(), ObservedState::new(40, 0));
    }

    #[test]
    fn nonpositive_quantity_is_rejected_remotely() {
        let fake = FakeLedger::new();
        let err = fake.create_usage_record(0, "k1").unwrap_err();
        assert_eq!(err.status(), Some(422));
    }
}
