//! # Client Configuration & Constants
//!
//! Every protocol default the client applies lives here: transaction
//! fees and validity windows, receipt polling cadence, and the deadline
//! for a single round trip to a node.
//!
//! Values a caller may reasonably want to tune are also exposed through
//! typed config structs ([`BackoffPolicy`], [`ConnectionConfig`]) with
//! `Default` impls built from these constants.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Transaction Defaults
// ---------------------------------------------------------------------------

/// How far behind the local clock a freshly minted valid-start timestamp
/// is placed. Nodes reject transactions whose start lies in their future,
/// so a little slack absorbs clock drift between client and node.
pub const TRANSACTION_VALID_START_SKEW: Duration = Duration::from_secs(5);

/// Default window, measured from valid start, during which a node will
/// accept the transaction.
pub const DEFAULT_TRANSACTION_VALID_DURATION: Duration = Duration::from_secs(120);

/// Shortest validity window a node accepts.
pub const MIN_TRANSACTION_VALID_DURATION: Duration = Duration::from_secs(15);

/// Longest validity window a node accepts.
pub const MAX_TRANSACTION_VALID_DURATION: Duration = Duration::from_secs(180);

/// Default maximum fee the payer authorizes for a transaction, in the
/// ledger's smallest unit.
pub const DEFAULT_TRANSACTION_FEE: u64 = 10;

/// Default auto-renew period for newly created accounts (30 days).
pub const DEFAULT_AUTO_RENEW_PERIOD: Duration = Duration::from_secs(2_592_000);

/// Maximum memo length in bytes.
pub const MAX_MEMO_LENGTH: usize = 100;

/// Shortest auto-renew period an account may carry (about 7 days).
pub const MIN_AUTO_RENEW_PERIOD: Duration = Duration::from_secs(604_800);

/// Longest auto-renew period an account may carry (about 92 days).
pub const MAX_AUTO_RENEW_PERIOD: Duration = Duration::from_secs(8_000_001);

/// How long a node keeps receipts and records after a transaction's
/// validity window has closed.
pub const RECEIPT_RETENTION: Duration = Duration::from_secs(180);

// ---------------------------------------------------------------------------
// Network
// ---------------------------------------------------------------------------

/// Default port a node listens on for client traffic.
pub const DEFAULT_NODE_PORT: u16 = 50211;

/// Deadline for establishing the TCP connection in [`Connection::open`].
///
/// [`Connection::open`]: crate::network::Connection::open
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Deadline for a single request/response round trip.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// JSON-RPC version string carried in every envelope.
pub const JSONRPC_VERSION: &str = "2.0";

// ---------------------------------------------------------------------------
// Receipt Polling
// ---------------------------------------------------------------------------

/// Delay before the second receipt poll. Later delays grow from here.
pub const RECEIPT_POLL_INITIAL_DELAY: Duration = Duration::from_secs(1);

/// Growth factor applied to the poll delay after each pending answer.
pub const RECEIPT_POLL_MULTIPLIER: u32 = 2;

/// Upper bound on the delay between two polls.
pub const RECEIPT_POLL_MAX_DELAY: Duration = Duration::from_secs(8);

/// Maximum number of receipt polls before giving up.
pub const RECEIPT_POLL_MAX_ATTEMPTS: u32 = 30;

/// Maximum wall time spent polling before giving up.
pub const RECEIPT_POLL_MAX_ELAPSED: Duration = Duration::from_secs(120);

// ---------------------------------------------------------------------------
// Config Structs
// ---------------------------------------------------------------------------

/// Bounded exponential backoff used by the receipt resolver.
///
/// The delay before poll `n + 1` is `initial_delay * multiplier^(n - 1)`,
/// capped at `max_delay`. Polling stops after `max_polls` polls or once
/// `max_elapsed` has passed, whichever comes first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Delay after the first pending answer.
    pub initial_delay: Duration,
    /// Factor applied to the delay after every further pending answer.
    pub multiplier: u32,
    /// Cap on any single delay.
    pub max_delay: Duration,
    /// Maximum number of polls, counting the first.
    pub max_polls: u32,
    /// Maximum total time spent in the polling state.
    pub max_elapsed: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_delay: RECEIPT_POLL_INITIAL_DELAY,
            multiplier: RECEIPT_POLL_MULTIPLIER,
            max_delay: RECEIPT_POLL_MAX_DELAY,
            max_polls: RECEIPT_POLL_MAX_ATTEMPTS,
            max_elapsed: RECEIPT_POLL_MAX_ELAPSED,
        }
    }
}

impl BackoffPolicy {
    /// A policy that waits the same `delay` between every poll.
    pub fn fixed(delay: Duration, max_polls: u32) -> Self {
        Self {
            initial_delay: delay,
            multiplier: 1,
            max_delay: delay,
            max_polls,
            max_elapsed: delay.saturating_mul(max_polls),
        }
    }

    /// Replace the poll limit.
    pub fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = max_polls;
        self
    }

    /// Replace the elapsed-time limit.
    pub fn with_max_elapsed(mut self, max_elapsed: Duration) -> Self {
        self.max_elapsed = max_elapsed;
        self
    }

    /// Delay to wait after the `pending`-th consecutive pending answer
    /// (1-based). Saturates instead of overflowing.
    pub fn delay_for(&self, pending: u32) -> Duration {
        let exponent = pending.saturating_sub(1);
        let factor = self.multiplier.checked_pow(exponent).unwrap_or(u32::MAX);
        self.initial_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Per-connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Deadline for establishing the underlying channel.
    pub connect_timeout: Duration,
    /// Deadline for one request/response round trip.
    pub request_timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}
