//! # CLI Interface
//!
//! Defines the command-line argument structure for `shardline-node` using
//! `clap` derive. Supports three subcommands: `run`, `keygen`, and
//! `version`.

use std::net::SocketAddr;

use clap::{ArgAction, Parser, Subcommand};
use shardline_client::AccountId;

use crate::logging::LogFormat;

/// Shardline development node.
///
/// Serves an in-memory ledger over newline-delimited JSON-RPC so clients
/// can be exercised end to end without a real network.
#[derive(Parser, Debug)]
#[command(
    name = "shardline-node",
    about = "Shardline development node",
    version,
    propagate_version = true
)]
pub struct ShardlineNodeCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the node binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the node.
    Run(RunArgs),
    /// Generate an Ed25519 key pair and print both halves.
    Keygen,
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Address to accept client connections on.
    #[arg(long, short = 'l', env = "SHARDLINE_LISTEN", default_value = "127.0.0.1:50211")]
    pub listen: SocketAddr,

    /// Genesis account funded at startup.
    #[arg(long, env = "SHARDLINE_OPERATOR", default_value = "0.0.2")]
    pub operator: AccountId,

    /// Hex-encoded Ed25519 secret key (raw or DER) for the genesis account.
    ///
    /// When omitted, a fresh key is generated and printed at startup.
    #[arg(long, env = "SHARDLINE_OPERATOR_KEY")]
    pub operator_key: Option<String>,

    /// Starting balance of the genesis account.
    #[arg(long, default_value_t = 1_000_000_000)]
    pub genesis_balance: u64,

    /// Account id this node accepts transactions for.
    #[arg(long, env = "SHARDLINE_NODE_ACCOUNT", default_value = "0.0.3")]
    pub node_account: AccountId,

    /// Receipt polls answered with UNKNOWN before a receipt is final.
    #[arg(long, default_value_t = 1)]
    pub consensus_polls: u32,

    /// How log lines are rendered.
    #[arg(long, value_enum, env = "SHARDLINE_LOG_FORMAT", default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Raise node log verbosity (-v debug, -vv trace). Ignored when
    /// RUST_LOG is set.
    #[arg(long, short = 'v', action = ArgAction::Count)]
    pub verbose: u8,
}
