use sapling_ledger::{LedgerClient, LedgerError, UsageRecord};
use sapling_reconcile::{reconcile_checked, DesiredState, ObservedState};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Result of one reconciliation pass.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReconcileOutcome {
    /// The quantity requested from the ledger this pass (0 for a no-op).
    pub delta: i64,
    /// The ledger's acknowledgement, present only when `delta > 0`.
    pub record: Option<UsageRecord>,
    /// Fresh observed state after the pass; this is what the host persists.
    pub observed: ObservedState,
}

impl ReconcileOutcome {
    pub fn is_noop(&self) -> bool {
        self.delta == 0
    }
}

/// Run one reconciliation pass for a single resource instance.
///
/// Steps, in order:
/// 1. validate `desired` (contract gate, no wire traffic on violation)
/// 2. fetch the current summary
/// 3. compute the cadence delta
/// 4. if the delta is strictly positive, create a usage record carrying the
///    instance's idempotency key
/// 5. refetch the summary for the state to persist
///
/// A zero delta skips steps 4 and 5 entirely; the summary from step 2 is
/// already current. Any ledger failure propagates immediately; in
/// particular a failed create is **not** followed by a refetch, so the
/// caller re-drives the whole pass on its own schedule.
pub fn reconcile_once(
    client: &dyn LedgerClient,
    desired: &DesiredState,
) -> Result<ReconcileOutcome, LedgerError> {
    desired.validate()?;

    let observed = client.fetch_summary()?;
    let delta = reconcile_checked(desired, &observed)?;

    debug!(
        cadence = desired.cadence.as_str(),
        target = desired.quantity,
        billed = observed.billed,
        unbilled = observed.unbilled,
        delta,
        "computed reconciliation delta"
    );

    if delta == 0 {
        return Ok(ReconcileOutcome {
            delta: 0,
            record: None,
            observed,
        });
    }

    let record = client.create_usage_record(delta, &desired.idempotency_key)?;
    let observed = client.fetch_summary()?;

    info!(
        record_id = %record.id,
        delta,
        billed = observed.billed,
        unbilled = observed.unbilled,
        "applied reconciliation delta"
    );

    Ok(ReconcileOutcome {
        delta,
        record: Some(record),
        observed,
    })
}
