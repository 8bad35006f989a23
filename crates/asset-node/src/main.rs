//! # Asset Node
//!
//! Hosts the asset ledger in memory for one session. Each invocation runs in
//! its own transaction: committed on success, discarded on failure.
//!
//! ```text
//! asset-node --seed TransferAsset asset6 Tom
//! asset-node --user user1 --usertype client ReadAsset asset1
//! asset-node --script session.jsonl
//! ```

mod cli;

use anyhow::{Context, Result};
use asset_transfer::prelude::*;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::cli::{Args, Invocation};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.config()?;
    let credential = args.credential();
    let invocations = args.invocations()?;

    let service = AssetTransferService::new(config).context("Failed to build asset service")?;
    let dispatcher = ContractDispatcher::new(service);
    let ledger = InMemoryLedger::new();
    let mut events = ledger.bus().subscribe(None);

    info!(invocations = invocations.len(), asset_version = asset_transfer::VERSION, "Session started");

    let mut failures = 0usize;
    for invocation in &invocations {
        match run(&ledger, &dispatcher, &credential, invocation) {
            Ok(output) => println!("{output}"),
            Err(err) => {
                failures += 1;
                error!(function = %invocation.function, error = %err, "Invocation failed");
                println!("{}", serde_json::json!({ "error": err.to_string() }));
            }
        }
        while let Ok(Some(event)) = events.try_recv() {
            let payload = String::from_utf8_lossy(&event.payload);
            println!(
                "{}",
                serde_json::json!({ "event": event.event_name, "txId": event.tx_id, "payload": payload })
            );
        }
    }

    info!(
        committed = ledger.committed_transactions()?,
        failures,
        "Session finished"
    );
    if failures > 0 {
        anyhow::bail!("{failures} invocation(s) failed");
    }
    Ok(())
}

fn run(
    ledger: &InMemoryLedger,
    dispatcher: &ContractDispatcher,
    credential: &X509Credential,
    invocation: &Invocation,
) -> Result<String, AssetError> {
    let mut tx = ledger.begin();
    let output = dispatcher.invoke(&mut tx, credential, &invocation.function, &invocation.args)?;
    tx.commit()?;
    Ok(output)
}
