use crate::{LedgerConfig, LedgerError};
use chrono::{DateTime, TimeZone, Utc};
use sapling_reconcile::{ContractError, ObservedState};
use serde::{Deserialize, Serialize};
use tracing::debug;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct UsageRecordRequest {
    quantity: i64,
}

/// A usage record as acknowledged by the ledger.
///
/// The ledger assigns `id`, echoes `quantity`, and stamps `created_at`
/// (epoch seconds, UTC).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub id: String,
    pub quantity: i64,
    pub payment_profile_id: String,
    pub created_at: i64,
}

impl UsageRecord {
    /// `created_at` as a UTC datetime. `None` if the stamp is out of range.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.created_at, 0).single()
    }
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    trees: i64,
    unbilled: UnbilledSummary,
}

#[derive(Debug, Deserialize)]
struct UnbilledSummary {
    trees: i64,
}

// ---------------------------------------------------------------------------
// Client trait
// ---------------------------------------------------------------------------

/// Remote planting-ledger contract: exactly one mutating operation and one
/// read-only operation.
///
/// Implementations must be object-safe so callers can hold a
/// `Box<dyn LedgerClient>` without knowing the concrete type, and
/// `Send + Sync` so independent instances can be driven from separate
/// threads (per-instance calls themselves are single-writer).
pub trait LedgerClient: Send + Sync {
    /// Create a usage record for `quantity` trees.
    ///
    /// Requires `quantity > 0` and a non-empty idempotency key; both are
    /// rejected as [`LedgerError::Contract`] before any network call. The
    /// same key must be forwarded on every retry of the same logical
    /// mutation; the remote service deduplicates per key.
    fn create_usage_record(
        &self,
        quantity: i64,
        idempotency_key: &str,
    ) -> Result<UsageRecord, LedgerError>;

    /// Fetch the current billed/unbilled summary.
    ///
    /// Read-only, reflects current remote truth, never served from a local
    /// cache, safe to call arbitrarily often.
    fn fetch_summary(&self) -> Result<ObservedState, LedgerError>;
}

// ---------------------------------------------------------------------------
// Blocking HTTP implementation
// ---------------------------------------------------------------------------

/// Blocking HTTP + JSON implementation of [`LedgerClient`].
///
/// All calls are synchronous; timeouts and retry policy belong to the
/// caller. This client never retries on its own: a blind retry without the
/// caller's stable idempotency key would risk double planting.
#[derive(Debug, Clone)]
pub struct HttpLedgerClient {
    cfg: LedgerConfig,
    http: reqwest::blocking::Client,
}

impl HttpLedgerClient {
    pub fn new(cfg: LedgerConfig) -> Self {
        Self {
            cfg,
            http: reqwest::blocking::Client::new(),
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.cfg
    }

    fn usage_records_url(&self) -> String {
        format!("{}/v1/usage-records", self.cfg.base_url.trim_end_matches('/'))
    }

    fn summary_url(&self) -> String {
        format!(
            "{}/v1.1/impacts/summary",
            self.cfg.base_url.trim_end_matches('/')
        )
    }

    /// Common response handling: status gate first, then JSON decode.
    /// Any status >= 300 surfaces the raw body as diagnostic text.
    fn decode<T: serde::de::DeserializeOwned>(
        resp: reqwest::blocking::Response,
    ) -> Result<T, LedgerError> {
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .map_err(|e| LedgerError::Transport(e.to_string()))?;

        if status >= 300 {
            return Err(LedgerError::Protocol { status, body });
        }

        serde_json::from_str(&body).map_err(|e| LedgerError::Decode(e.to_string()))
    }
}

impl LedgerClient for HttpLedgerClient {
    fn create_usage_record(
        &self,
        quantity: i64,
        idempotency_key: &str,
    ) -> Result<UsageRecord, LedgerError> {
        // Contract gates before any wire traffic.
        if quantity <= 0 {
            return Err(ContractError::NonPositiveMutationQuantity(quantity).into());
        }
        if idempotency_key.is_empty() {
            return Err(ContractError::EmptyIdempotencyKey.into());
        }

        debug!(quantity, "creating ledger usage record");

        let resp = self
            .http
            .post(self.usage_records_url())
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .header("X-Api-Key", &self.cfg.api_key)
            .header("Idempotency-Key", idempotency_key)
            .json(&UsageRecordRequest { quantity })
            .send()
            .map_err(|e| LedgerError::Transport(e.to_string()))?;

        let record: UsageRecord = Self::decode(resp)?;
        debug!(record_id = %record.id, quantity = record.quantity, "usage record acknowledged");
        Ok(record)
    }

    fn fetch_summary(&self) -> Result<ObservedState, LedgerError> {
        let resp = self
            .http
            .get(self.summary_url())
            .header("Accept", "application/json")
            .header("X-Api-Key", &self.cfg.api_key)
            .send()
            .map_err(|e| LedgerError::Transport(e.to_string()))?;

        let summary: SummaryResponse = Self::decode(resp)?;
        let observed = self
            .cfg
            .trees_mapping
            .observed(summary.trees, summary.unbilled.trees);

        // Negative remote counters are a malformed summary, not a caller bug.
        observed
            .validate()
            .map_err(|e| LedgerError::Decode(e.to_string()))?;

        debug!(
            billed = observed.billed,
            unbilled = observed.unbilled,
            "fetched ledger summary"
        );
        Ok(observed)
    }
}
