//! Error types for the client.
//!
//! Every fallible client operation returns [`Error`]. Node-level rejections
//! (a non-OK precheck) and consensus-level failures (a terminal receipt
//! status other than success) are *not* errors: they come back as values
//! the caller must inspect. An `Error` means the client could not learn
//! the node's judgment at all, or refused to ask because the input was
//! locally invalid.

use std::time::Duration;

use thiserror::Error;

use crate::crypto::KeyError;
use crate::status::Status;

/// Shorthand for results returned by this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by client operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A string could not be parsed as an identifier. Never reaches the network.
    #[error("malformed {expected}: {input:?}")]
    MalformedIdentifier {
        /// The rejected input.
        input: String,
        /// What the input was supposed to be, e.g. `"account id"`.
        expected: &'static str,
    },

    /// The channel to the node could not be established.
    #[error("failed to connect to {address}: {source}")]
    Connection {
        /// The address that was dialed.
        address: String,
        /// What went wrong.
        #[source]
        source: TransportError,
    },

    /// A request was issued on a connection that has been closed.
    #[error("connection is closed")]
    ConnectionClosed,

    /// The round trip failed in transport. Says nothing about whether the
    /// node received the request.
    #[error("submission failed: {0}")]
    Submission(#[source] TransportError),

    /// No reply arrived within the connection's request deadline.
    #[error("request timed out after {after:?}")]
    Timeout {
        /// The deadline that expired.
        after: Duration,
    },

    /// Transfer amounts on one transaction do not net to zero.
    #[error("transfer amounts do not net to zero (sum {sum})")]
    UnbalancedTransfer {
        /// The non-zero sum of all signed amounts.
        sum: i128,
    },

    /// An account's auto-renew period lies outside what the network accepts.
    #[error("auto-renew period {period:?} is outside the accepted range")]
    AutoRenewPeriod {
        /// The rejected period.
        period: Duration,
    },

    /// A field the transaction body needs was never set.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The body was modified after signatures were attached, so they no
    /// longer cover what would be submitted.
    #[error("transaction body changed after it was signed")]
    StaleSignature,

    /// The node answered with a non-OK precheck where an answer was required.
    #[error("node rejected the request: {0}")]
    PreCheck(Status),

    /// The node's reply does not match the request that was sent.
    #[error("unexpected response: expected {expected}")]
    UnexpectedResponse {
        /// The reply kind that was expected.
        expected: &'static str,
    },

    /// Key parsing or decoding failed.
    #[error(transparent)]
    Key(#[from] KeyError),

    /// A body could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(String),
}

impl Error {
    pub(crate) fn malformed(input: impl Into<String>, expected: &'static str) -> Self {
        Self::MalformedIdentifier {
            input: input.into(),
            expected,
        }
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Self::Codec(err.to_string())
    }
}

/// Failures of the channel between client and node.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Socket-level failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer closed the channel, or it was closed locally.
    #[error("channel closed")]
    Closed,

    /// The node could not be reached at all.
    #[error("node unreachable")]
    Unreachable,

    /// A frame could not be encoded or decoded.
    #[error("malformed frame: {0}")]
    Frame(String),

    /// The node answered with a JSON-RPC error object.
    #[error("rpc error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i32,
        /// Error message from the node.
        message: String,
    },
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Frame(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::malformed("not-an-id", "account id");
        assert_eq!(err.to_string(), "malformed account id: \"not-an-id\"");

        let err = Error::UnbalancedTransfer { sum: -50 };
        assert!(err.to_string().contains("-50"));

        let err = Error::Submission(TransportError::Closed);
        assert_eq!(err.to_string(), "submission failed: channel closed");
    }

    #[test]
    fn test_transport_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let err: TransportError = io.into();
        assert!(matches!(err, TransportError::Io(_)));
    }
}
