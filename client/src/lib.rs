// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Shardline Client
//!
//! Client library for a ledger whose accounts are addressed as
//! `shard.realm.account`. It builds transactions, signs them with Ed25519
//! keys, submits them to a node, and tracks them until consensus.
//!
//! ## Architecture
//!
//! - **id** / **timestamp**: account and transaction identifiers, with the
//!   `0.0.2@1700000000.000000042` text forms.
//! - **crypto**: Ed25519 keys and signatures behind the [`Signer`] trait.
//! - **transaction**: a typed builder per transaction kind, sharing one
//!   sign-then-execute lifecycle.
//! - **query**: balance, info, receipt and record lookups, with cost and
//!   answer phases.
//! - **receipt**: receipts, records, and the resolver that polls for a
//!   final receipt with backoff.
//! - **network**: the [`Connection`] handle, the request/response model, the
//!   newline-delimited JSON-RPC transport and an in-memory [`Emulator`].
//! - **status** / **error**: node-reported outcomes versus local failures.
//! - **config**: protocol constants and tunable defaults.
//!
//! ## Outcomes
//!
//! A node's verdict is a [`Status`] and is returned as a value, never as an
//! error. [`Error`] is reserved for things that went wrong on this side of
//! the wire: malformed input, local validation, transport trouble.

pub mod config;
pub mod crypto;
pub mod error;
pub mod id;
pub mod network;
pub mod query;
pub mod receipt;
pub mod status;
pub mod timestamp;
pub mod transaction;

pub use config::{BackoffPolicy, ConnectionConfig};
pub use crypto::{KeyError, PublicKey, SecretKey, Signature, Signer};
pub use error::{Error, Result, TransportError};
pub use id::{AccountId, TransactionId};
pub use network::{Connection, Emulator, EmulatorConfig};
pub use query::{AccountInfo, Query};
pub use receipt::{ReceiptOutcome, ReceiptResolver, TransactionReceipt, TransactionRecord};
pub use status::Status;
pub use timestamp::Timestamp;
pub use transaction::{Transaction, TransactionResponse};
