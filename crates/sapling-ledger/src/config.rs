use crate::LedgerError;
use sapling_reconcile::ObservedState;
use serde::{Deserialize, Serialize};

/// Production ledger endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.thetreeapp.org";

/// How the summary endpoint's top-level `trees` field maps onto
/// [`ObservedState`].
///
/// The ledger's summary schema is ambiguous about whether `trees` is the
/// billed-only count or the lifetime total. The mapping is therefore an
/// explicit configuration knob rather than a guess baked into the decoder.
/// Default is [`TreesFieldMapping::BilledOnly`]; confirm against the account
/// before overriding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreesFieldMapping {
    /// `trees` is the billed count: `billed = trees`, `unbilled = unbilled.trees`.
    #[default]
    BilledOnly,
    /// `trees` is the lifetime total: `billed = trees - unbilled.trees`.
    /// A summary with `trees < unbilled.trees` is self-inconsistent; the
    /// negative billed count fails validation downstream, exactly like a
    /// negative counter under `BilledOnly`.
    LifetimeTotal,
}

impl TreesFieldMapping {
    /// Map the raw summary counters onto an [`ObservedState`].
    ///
    /// No clamping: inconsistent remote counters must surface as a decode
    /// failure at the client, never as a silently repaired state.
    pub fn observed(&self, trees: i64, unbilled_trees: i64) -> ObservedState {
        match self {
            TreesFieldMapping::BilledOnly => ObservedState::new(trees, unbilled_trees),
            TreesFieldMapping::LifetimeTotal => {
                ObservedState::new(trees.saturating_sub(unbilled_trees), unbilled_trees)
            }
        }
    }
}

/// Configuration for one ledger client.
///
/// `Debug` redacts the API key; error messages reference env var **names**,
/// never values, and the key is never logged.
#[derive(Clone)]
pub struct LedgerConfig {
    pub base_url: String,
    pub api_key: String,
    pub trees_mapping: TreesFieldMapping,
}

impl std::fmt::Debug for LedgerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<REDACTED>")
            .field("trees_mapping", &self.trees_mapping)
            .finish()
    }
}

impl LedgerConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            trees_mapping: TreesFieldMapping::default(),
        }
    }

    pub fn with_trees_mapping(mut self, mapping: TreesFieldMapping) -> Self {
        self.trees_mapping = mapping;
        self
    }
}

/// Resolve an API key from the named environment variable.
///
/// Callers resolve once at startup and pass the key into constructors; do
/// not scatter `std::env::var` calls across the codebase.
pub fn resolve_api_key(env_var: &str) -> Result<String, LedgerError> {
    match std::env::var(env_var) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(LedgerError::Config(format!(
            "missing or empty API key: set the {env_var} environment variable"
        ))),
    }
}
