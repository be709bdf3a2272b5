//! # Node Connectivity
//!
//! A [`Connection`] owns one [`Channel`] to one node and is the only way
//! requests leave the client. Two channels ship with the crate:
//!
//! - [`TcpChannel`]: newline-delimited JSON-RPC over TCP, produced by
//!   [`Connection::open`].
//! - [`Emulator`]: an in-memory ledger that answers requests directly,
//!   for tests and local development.

pub mod connection;
pub mod emulator;
pub mod message;
pub mod rpc;
pub mod tcp;

pub use connection::Connection;
pub use emulator::{Emulator, EmulatorConfig};
pub use message::{Answer, QueryBody, QueryRequest, QueryResponse, Request, Response, ResponseType};
pub use tcp::TcpChannel;

use async_trait::async_trait;

use crate::error::TransportError;

/// A request/response channel to a node.
///
/// Implementations must be safe to call from several tasks at once; they
/// serialize or multiplex their own I/O.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable peer address, for logs.
    fn address(&self) -> &str;

    /// One round trip.
    async fn call(&self, request: Request) -> Result<Response, TransportError>;

    /// Releases the underlying resource. Later calls fail with
    /// [`TransportError::Closed`].
    async fn close(&self);
}
