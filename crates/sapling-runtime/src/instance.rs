use crate::driver::{reconcile_once, ReconcileOutcome};
use sapling_ledger::{LedgerClient, LedgerError};
use sapling_reconcile::{Cadence, ContractError, DesiredState, ObservedState};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Lifecycle phase of one managed resource instance.
///
/// `Uninitialized -> Reconciled -> Reconciled ... -> Removed`. There is no
/// terminal failed phase: a failed pass surfaces its error and the instance
/// stays in its last successfully observed state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstancePhase {
    #[default]
    Uninitialized,
    Reconciled,
    Removed,
}

/// Per-instance bookkeeping for the orchestrator.
///
/// Owns the one thing that must be generated exactly once and never change:
/// the idempotency key. The key is created at construction (unless the host
/// restores a persisted one) and reused verbatim on every pass and retry.
///
/// Single-writer: drive each instance from one caller at a time. Distinct
/// instances are independent.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResourceInstance {
    quantity: i64,
    cadence: Cadence,
    idempotency_key: String,
    phase: InstancePhase,
    last_observed: Option<ObservedState>,
}

impl ResourceInstance {
    /// New instance with a freshly generated idempotency key.
    pub fn new(quantity: i64, cadence: Cadence) -> Self {
        Self::with_idempotency_key(quantity, cadence, Uuid::new_v4().to_string())
    }

    /// New instance restoring a previously persisted idempotency key.
    pub fn with_idempotency_key(
        quantity: i64,
        cadence: Cadence,
        idempotency_key: impl Into<String>,
    ) -> Self {
        Self {
            quantity,
            cadence,
            idempotency_key: idempotency_key.into(),
            phase: InstancePhase::Uninitialized,
            last_observed: None,
        }
    }

    pub fn idempotency_key(&self) -> &str {
        &self.idempotency_key
    }

    pub fn phase(&self) -> InstancePhase {
        self.phase
    }

    /// Observed state from the last successful pass, if any.
    pub fn last_observed(&self) -> Option<ObservedState> {
        self.last_observed
    }

    pub fn desired(&self) -> DesiredState {
        DesiredState::new(self.quantity, self.cadence, self.idempotency_key.clone())
    }

    fn ensure_live(&self) -> Result<(), LedgerError> {
        if self.phase == InstancePhase::Removed {
            return Err(ContractError::InstanceRemoved.into());
        }
        Ok(())
    }

    fn apply(&mut self, outcome: &ReconcileOutcome) {
        self.phase = InstancePhase::Reconciled;
        self.last_observed = Some(outcome.observed);
    }

    /// First reconciliation of this instance (host create hook).
    pub fn create(&mut self, client: &dyn LedgerClient) -> Result<ReconcileOutcome, LedgerError> {
        self.ensure_live()?;
        let outcome = reconcile_once(client, &self.desired())?;
        self.apply(&outcome);
        Ok(outcome)
    }

    /// Re-derive observed state and close any drift (host read hook).
    ///
    /// Same pass as `create`; the split exists so hosts can map their
    /// lifecycle callbacks one-to-one.
    pub fn refresh(&mut self, client: &dyn LedgerClient) -> Result<ReconcileOutcome, LedgerError> {
        self.ensure_live()?;
        let outcome = reconcile_once(client, &self.desired())?;
        self.apply(&outcome);
        Ok(outcome)
    }

    /// Change the target and reconcile (host update hook). The idempotency
    /// key is deliberately untouched.
    pub fn update(
        &mut self,
        client: &dyn LedgerClient,
        quantity: i64,
        cadence: Cadence,
    ) -> Result<ReconcileOutcome, LedgerError> {
        self.ensure_live()?;
        self.quantity = quantity;
        self.cadence = cadence;
        let outcome = reconcile_once(client, &self.desired())?;
        self.apply(&outcome);
        Ok(outcome)
    }

    /// Remove the instance. Local bookkeeping only.
    ///
    /// The ledger has no reversal operation; planted trees stay planted.
    /// No client handle is taken: removal cannot touch the wire.
    pub fn remove(&mut self) {
        info!(phase = ?self.phase, "removing resource instance (ledger entries persist)");
        self.phase = InstancePhase::Removed;
    }
}
