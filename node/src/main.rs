// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Shardline Development Node
//!
//! Entry point for the `shardline-node` binary. Parses CLI arguments,
//! initializes logging, seeds an in-memory ledger and serves it over
//! newline-delimited JSON-RPC.
//!
//! - `run`     start the node
//! - `keygen`  print a fresh Ed25519 key pair
//! - `version` print build version information

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;

use shardline_client::{Emulator, EmulatorConfig, SecretKey};
use shardline_node::cli::{self, Commands, ShardlineNodeCli};
use shardline_node::logging;
use shardline_node::server::NodeServer;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = ShardlineNodeCli::parse();

    match cli.command {
        Commands::Run(args) => run_node(args).await,
        Commands::Keygen => {
            keygen();
            Ok(())
        }
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

async fn run_node(args: cli::RunArgs) -> Result<()> {
    logging::init_logging(args.log_format, args.verbose).context("failed to initialize logging")?;

    let operator_key = match &args.operator_key {
        Some(hex) => hex
            .parse::<SecretKey>()
            .context("failed to parse --operator-key")?,
        None => {
            let key = SecretKey::generate();
            tracing::warn!("no operator key given, generated one for this session");
            println!("Operator secret key : {key}");
            key
        }
    };

    let emulator = Emulator::new(EmulatorConfig {
        node_accounts: vec![args.node_account],
        consensus_polls: Some(args.consensus_polls),
        ..EmulatorConfig::default()
    });
    emulator.create_account(args.operator, operator_key.public(), args.genesis_balance);
    // The node account collects fees; nobody signs for it.
    emulator.create_account(args.node_account, SecretKey::generate().public(), 0);

    let server = NodeServer::bind(args.listen, emulator)
        .await
        .with_context(|| format!("failed to bind listener on {}", args.listen))?;
    let local_addr = server.local_addr().context("failed to read bound address")?;

    tracing::info!(
        listen = %local_addr,
        operator = %args.operator,
        operator_key = %operator_key.public(),
        node_account = %args.node_account,
        genesis_balance = args.genesis_balance,
        consensus_polls = args.consensus_polls,
        "starting shardline-node"
    );

    server
        .serve(shutdown_signal())
        .await
        .context("server failed")?;

    tracing::info!("shardline-node stopped");
    Ok(())
}

fn keygen() {
    let key = SecretKey::generate();
    println!("Secret key : {key}");
    println!("Public key : {}", key.public());
}

fn print_version() {
    println!("shardline-node {}", env!("CARGO_PKG_VERSION"));
    println!("json-rpc       {}", shardline_client::config::JSONRPC_VERSION);
    println!("rustc          {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("shutdown signal received");
}
