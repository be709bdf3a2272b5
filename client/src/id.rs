//! Entity and transaction identifiers.
//!
//! Both identifiers have a canonical string form that round-trips through
//! [`Display`](fmt::Display) and [`FromStr`]:
//!
//! - [`AccountId`]: `shard.realm.account`, e.g. `0.0.1001`
//! - [`TransactionId`]: `shard.realm.account@seconds.nanos`, e.g.
//!   `0.0.2@1700000000.000000042`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::timestamp::{is_digits, Timestamp};

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// Address of an entity in the shard/realm/account namespace.
///
/// Field order, constructor argument order, and the canonical string all
/// run shard, realm, account. Every component is non-negative; ids decoded
/// from the wire are checked for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "AccountIdParts")]
pub struct AccountId {
    pub shard: i64,
    pub realm: i64,
    pub account: i64,
}

impl AccountId {
    /// Builds an id from known-good components. Negative components are a
    /// programming error; use [`AccountId::try_new`] for untrusted input.
    pub const fn new(shard: i64, realm: i64, account: i64) -> Self {
        debug_assert!(shard >= 0 && realm >= 0 && account >= 0, "negative account id component");
        Self {
            shard,
            realm,
            account,
        }
    }

    /// Fails with [`Error::MalformedIdentifier`] if any component is
    /// negative.
    pub fn try_new(shard: i64, realm: i64, account: i64) -> Result<Self> {
        if shard < 0 || realm < 0 || account < 0 {
            return Err(Error::malformed(format!("{shard}.{realm}.{account}"), "account id"));
        }
        Ok(Self::new(shard, realm, account))
    }

    /// Shorthand for an account in shard 0, realm 0.
    pub const fn simple(account: i64) -> Self {
        Self::new(0, 0, account)
    }
}

#[derive(Deserialize)]
struct AccountIdParts {
    shard: i64,
    realm: i64,
    account: i64,
}

impl TryFrom<AccountIdParts> for AccountId {
    type Error = Error;

    fn try_from(parts: AccountIdParts) -> Result<Self> {
        Self::try_new(parts.shard, parts.realm, parts.account)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.shard, self.realm, self.account)
    }
}

impl FromStr for AccountId {
    type Err = Error;

    /// Accepts exactly three non-negative decimal integers separated by dots.
    fn from_str(s: &str) -> Result<Self> {
        let malformed = || Error::malformed(s, "account id");

        let mut parts = s.split('.');
        let mut next = || -> Result<i64> {
            let part = parts.next().filter(|p| is_digits(p)).ok_or_else(malformed)?;
            part.parse().map_err(|_| malformed())
        };
        let shard = next()?;
        let realm = next()?;
        let account = next()?;
        if parts.next().is_some() {
            return Err(malformed());
        }
        Ok(Self::new(shard, realm, account))
    }
}

// ---------------------------------------------------------------------------
// TransactionId
// ---------------------------------------------------------------------------

/// Identity of a transaction: the paying account plus its valid start.
///
/// The network treats a second submission with the same id as a duplicate,
/// so every new logical transaction needs a freshly generated id, while a
/// retry of the same logical transaction must reuse it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransactionId {
    pub account_id: AccountId,
    pub valid_start: Timestamp,
}

impl TransactionId {
    pub fn new(account_id: AccountId, valid_start: Timestamp) -> Self {
        Self {
            account_id,
            valid_start,
        }
    }

    /// Mints a new id for `account_id` with a fresh valid start from
    /// [`Timestamp::generate`].
    pub fn generate(account_id: AccountId) -> Self {
        Self::new(account_id, Timestamp::generate())
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.account_id, self.valid_start)
    }
}

impl FromStr for TransactionId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (account, start) = s
            .split_once('@')
            .ok_or_else(|| Error::malformed(s, "transaction id"))?;
        let account_id = account
            .parse()
            .map_err(|_| Error::malformed(s, "transaction id"))?;
        let valid_start = start
            .parse()
            .map_err(|_| Error::malformed(s, "transaction id"))?;
        Ok(Self::new(account_id, valid_start))
    }
}
