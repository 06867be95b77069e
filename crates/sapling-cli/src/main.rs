//! sapling CLI entry point.
//!
//! This file is intentionally thin: it sets up tracing, resolves the ledger
//! configuration from flags and environment, and runs a single operation
//! against the real ledger. All reconciliation logic lives in
//! sapling-runtime; all wire logic lives in sapling-ledger.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use sapling_ledger::{
    resolve_api_key, HttpLedgerClient, LedgerClient, LedgerConfig, TreesFieldMapping,
    DEFAULT_BASE_URL,
};
use sapling_reconcile::{Cadence, DesiredState};
use sapling_runtime::reconcile_once;
use tracing::info;
use uuid::Uuid;

/// Env var holding the ledger API key. Only the name is ever printed.
const API_KEY_ENV: &str = "SAPLING_LEDGER_API_KEY";

#[derive(Parser)]
#[command(name = "sapling")]
#[command(about = "Tree-planting ledger reconciliation CLI", long_about = None)]
struct Cli {
    /// Ledger endpoint.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// How the summary's `trees` field maps onto billed/unbilled.
    #[arg(long, value_enum, default_value = "billed-only")]
    trees_mapping: TreesMappingArg,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TreesMappingArg {
    BilledOnly,
    LifetimeTotal,
}

impl From<TreesMappingArg> for TreesFieldMapping {
    fn from(arg: TreesMappingArg) -> Self {
        match arg {
            TreesMappingArg::BilledOnly => TreesFieldMapping::BilledOnly,
            TreesMappingArg::LifetimeTotal => TreesFieldMapping::LifetimeTotal,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and print the current billed/unbilled summary.
    Summary,

    /// Run one reconciliation pass for a declared target.
    Reconcile {
        /// Target quantity of trees.
        #[arg(long)]
        quantity: i64,

        /// one_time | per_month | per_deployment
        #[arg(long, default_value = "one_time")]
        cadence: String,

        /// Idempotency key of the resource instance. Generated (and printed)
        /// when omitted; persist it and pass it back on every retry.
        #[arg(long)]
        idempotency_key: Option<String>,
    },
}

fn main() -> Result<()> {
    // Load .env.local if present (dev convenience). Silent if the file does
    // not exist; production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();

    let api_key = resolve_api_key(API_KEY_ENV)?;
    let cfg = LedgerConfig::new(cli.base_url, api_key).with_trees_mapping(cli.trees_mapping.into());
    let client = HttpLedgerClient::new(cfg);

    match cli.cmd {
        Commands::Summary => {
            let observed = client.fetch_summary()?;
            println!("{}", serde_json::to_string_pretty(&observed)?);
        }

        Commands::Reconcile {
            quantity,
            cadence,
            idempotency_key,
        } => {
            let cadence = Cadence::parse(&cadence)?;
            let key = idempotency_key.unwrap_or_else(|| {
                let generated = Uuid::new_v4().to_string();
                info!(idempotency_key = %generated, "generated new idempotency key; persist it for retries");
                generated
            });

            let desired = DesiredState::new(quantity, cadence, key);
            let outcome = reconcile_once(&client, &desired)
                .context("reconciliation pass failed; re-run with the same idempotency key")?;

            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}
