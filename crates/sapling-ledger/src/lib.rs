//! sapling-ledger
//!
//! Client boundary to the remote planting ledger.
//!
//! This crate owns the wire protocol (HTTP + JSON), the error taxonomy for
//! ledger calls, and client configuration. It performs no reconciliation:
//! callers fetch a summary, compute a delta with `sapling-reconcile`, and,
//! only for a strictly positive delta, create a usage record here.
//!
//! Idempotency contract: the remote service is the source of truth for
//! at-most-once enforcement per key. This client's only obligation is to
//! forward the caller's key unchanged on every call for the same logical
//! mutation and never to invent a new one on retry.

mod client;
mod config;
mod error;

pub use client::{HttpLedgerClient, LedgerClient, UsageRecord};
pub use config::{resolve_api_key, LedgerConfig, TreesFieldMapping, DEFAULT_BASE_URL};
pub use error::LedgerError;
