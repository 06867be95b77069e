use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a desired quantity is reinterpreted across reconciliations.
///
/// Serde / wire representation uses the user-facing strings
/// `one_time`, `per_month`, `per_deployment`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    /// The lifetime total already planted counts toward the target.
    #[default]
    OneTime,
    /// Only the not-yet-billed portion counts; billed history resets each period.
    PerMonth,
    /// Every reconciliation is an independent event; no history is consulted.
    PerDeployment,
}

impl Cadence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cadence::OneTime => "one_time",
            Cadence::PerMonth => "per_month",
            Cadence::PerDeployment => "per_deployment",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ContractError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "one_time" => Ok(Cadence::OneTime),
            "per_month" => Ok(Cadence::PerMonth),
            "per_deployment" => Ok(Cadence::PerDeployment),
            other => Err(ContractError::InvalidCadence(other.to_string())),
        }
    }
}

/// Caller-declared target for one resource instance.
///
/// The idempotency key is generated exactly once at first creation and is
/// immutable thereafter; every retry of the same logical mutation must carry
/// the same key so the remote ledger can deduplicate it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredState {
    /// Target quantity of trees. Must be >= 0.
    pub quantity: i64,
    pub cadence: Cadence,
    /// Opaque, stable per logical resource instance.
    pub idempotency_key: String,
}

impl DesiredState {
    pub fn new(quantity: i64, cadence: Cadence, idempotency_key: impl Into<String>) -> Self {
        Self {
            quantity,
            cadence,
            idempotency_key: idempotency_key.into(),
        }
    }

    /// Reject contract violations before any delta computation or wire call.
    ///
    /// A negative stored quantity is a caller bug; clamping it would hide the
    /// bug behind a silent no-op.
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.quantity < 0 {
            return Err(ContractError::NegativeDesiredQuantity(self.quantity));
        }
        Ok(())
    }
}

/// Ledger truth at one point in time: billed and unbilled planted-tree counts.
///
/// Always sourced fresh from the ledger. Never cache an `ObservedState`
/// across reconciliations; the delta computation is only correct against
/// current remote truth.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedState {
    /// Trees already invoiced.
    pub billed: i64,
    /// Trees planted but not yet invoiced.
    pub unbilled: i64,
}

impl ObservedState {
    pub fn new(billed: i64, unbilled: i64) -> Self {
        Self { billed, unbilled }
    }

    /// Lifetime total planted (billed + unbilled).
    ///
    /// Saturating: the counters are remote-supplied, and a total is only
    /// ever compared or displayed, so pegging at `i64::MAX` beats a panic.
    pub fn lifetime_total(&self) -> i64 {
        self.billed.saturating_add(self.unbilled)
    }

    /// Both counters are independent and must be non-negative. The engine
    /// makes no assumption that `billed` stays under any target.
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.billed < 0 || self.unbilled < 0 {
            return Err(ContractError::NegativeObservedCounter {
                billed: self.billed,
                unbilled: self.unbilled,
            });
        }
        Ok(())
    }
}

/// Caller-supplied state violated an invariant. Rejected before any
/// computation or network call is made.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ContractError {
    #[error("desired quantity must be >= 0, got {0}")]
    NegativeDesiredQuantity(i64),

    #[error("observed counters must be >= 0, got billed={billed} unbilled={unbilled}")]
    NegativeObservedCounter { billed: i64, unbilled: i64 },

    #[error("mutation quantity must be > 0, got {0}")]
    NonPositiveMutationQuantity(i64),

    #[error("idempotency key must not be empty for a mutation")]
    EmptyIdempotencyKey,

    #[error("invalid cadence '{0}'. expected one of: one_time | per_month | per_deployment")]
    InvalidCadence(String),

    #[error("resource instance already removed")]
    InstanceRemoved,
}
