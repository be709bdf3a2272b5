//! Wall-clock timestamps with nanosecond precision.
//!
//! A [`Timestamp`] doubles as the valid-start half of a
//! [`TransactionId`](crate::TransactionId), which the network uses as a
//! deduplication key. [`Timestamp::generate`] therefore never hands out the
//! same value twice within one process, even when called from many threads
//! inside the same clock tick.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::{Error, Result};

const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Last value handed out by [`Timestamp::generate`], in nanoseconds since
/// the Unix epoch.
static LAST_GENERATED: AtomicI64 = AtomicI64::new(i64::MIN);

/// Seconds and nanoseconds since the Unix epoch. `nanos` is always in
/// `0..1_000_000_000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: i32,
}

impl Timestamp {
    /// Builds a timestamp from its parts, carrying excess nanoseconds into
    /// seconds.
    pub fn new(seconds: i64, nanos: i32) -> Self {
        Self::from_nanos(
            seconds
                .saturating_mul(NANOS_PER_SECOND)
                .saturating_add(i64::from(nanos)),
        )
    }

    /// The current wall-clock time.
    pub fn now() -> Self {
        Self::from(Utc::now())
    }

    /// A fresh valid-start timestamp: the current time minus
    /// [`config::TRANSACTION_VALID_START_SKEW`], bumped forward by one
    /// nanosecond when needed so that no two calls in this process return
    /// the same value.
    pub fn generate() -> Self {
        let candidate = Self::now().saturating_sub(config::TRANSACTION_VALID_START_SKEW).as_nanos();
        let mut last = LAST_GENERATED.load(Ordering::Acquire);
        loop {
            let next = candidate.max(last.saturating_add(1));
            match LAST_GENERATED.compare_exchange_weak(
                last,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Self::from_nanos(next),
                Err(actual) => last = actual,
            }
        }
    }

    /// Nanoseconds since the Unix epoch, saturating at the `i64` range.
    pub fn as_nanos(&self) -> i64 {
        self.seconds
            .saturating_mul(NANOS_PER_SECOND)
            .saturating_add(i64::from(self.nanos))
    }

    /// Inverse of [`as_nanos`](Self::as_nanos).
    pub fn from_nanos(nanos: i64) -> Self {
        Self {
            seconds: nanos.div_euclid(NANOS_PER_SECOND),
            nanos: nanos.rem_euclid(NANOS_PER_SECOND) as i32,
        }
    }

    /// `self + duration`, saturating.
    pub fn saturating_add(&self, duration: Duration) -> Self {
        let delta = i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX);
        Self::from_nanos(self.as_nanos().saturating_add(delta))
    }

    /// `self - duration`, saturating.
    pub fn saturating_sub(&self, duration: Duration) -> Self {
        let delta = i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX);
        Self::from_nanos(self.as_nanos().saturating_sub(delta))
    }
}

/// Renders as `seconds.nanos` with nanos zero-padded to nine digits.
// A leap second shows up as `timestamp_subsec_nanos() >= 1e9`.
impl From<DateTime<Utc>> for Timestamp {
    fn from(time: DateTime<Utc>) -> Self {
        Self::new(time.timestamp(), time.timestamp_subsec_nanos() as i32)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.seconds, self.nanos)
    }
}

/// Parses `seconds.nanos`. The nanos field is read as an integer count of
/// nanoseconds, one to nine digits.
impl FromStr for Timestamp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let malformed = || Error::malformed(s, "timestamp");

        let (seconds, nanos) = s.split_once('.').ok_or_else(malformed)?;
        if !is_digits(seconds) || !is_digits(nanos) || nanos.len() > 9 {
            return Err(malformed());
        }
        let seconds: i64 = seconds.parse().map_err(|_| malformed())?;
        let nanos: i32 = nanos.parse().map_err(|_| malformed())?;
        Ok(Self { seconds, nanos })
    }
}

pub(crate) fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
