use sapling_reconcile::ContractError;
use thiserror::Error;

/// Errors a ledger call may return.
///
/// The taxonomy is the retry contract: only `Transport` is safe to retry
/// blindly, and then only with the **same** idempotency key. Nothing in this
/// crate retries on its own; every failure propagates to the caller with
/// enough context to decide.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Connection / DNS / timeout failure before a response was received.
    /// Retryable by the caller using the same idempotency key.
    #[error("transport error: {0}")]
    Transport(String),

    /// The ledger answered with status >= 300. Carries the raw response body
    /// as diagnostic text. Not blindly retryable, since it may be a permanent
    /// rejection (e.g. an invalid quantity).
    #[error("ledger api error ({status}): {body}")]
    Protocol { status: u16, body: String },

    /// A response body did not parse as the expected JSON shape. Fatal for
    /// that call.
    #[error("decode error: {0}")]
    Decode(String),

    /// Caller-side invariant violation, rejected before any network call.
    #[error("contract violation: {0}")]
    Contract(#[from] ContractError),

    /// A required configuration value (e.g. API key) is missing or invalid.
    #[error("config error: {0}")]
    Config(String),
}

impl LedgerError {
    /// True only for failures where no response was received, i.e. the
    /// request may never have reached the ledger.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::Transport(_))
    }

    /// Protocol status code, when this is a protocol-level failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            LedgerError::Protocol { status, .. } => Some(*status),
            _ => None,
        }
    }
}
