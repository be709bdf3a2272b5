//! Account creation.

use std::time::Duration;

use super::body::{CryptoCreateAccountBody, TransactionData};
use super::{Transaction, TransactionKind};
use crate::config;
use crate::crypto::PublicKey;
use crate::error::{Error, Result};

/// Payload of an account-creation transaction.
#[derive(Debug, Clone)]
pub struct CryptoCreateAccount {
    key: Option<PublicKey>,
    initial_balance: u64,
    auto_renew_period: Duration,
}

impl Default for CryptoCreateAccount {
    fn default() -> Self {
        Self {
            key: None,
            initial_balance: 0,
            auto_renew_period: config::DEFAULT_AUTO_RENEW_PERIOD,
        }
    }
}

impl TransactionKind for CryptoCreateAccount {
    fn validate(&self) -> Result<()> {
        self.key.ok_or(Error::MissingField("key"))?;
        check_auto_renew_period(self.auto_renew_period)
    }

    fn to_data(&self) -> Result<TransactionData> {
        Ok(TransactionData::CryptoCreateAccount(CryptoCreateAccountBody {
            key: self.key.ok_or(Error::MissingField("key"))?,
            initial_balance: self.initial_balance,
            auto_renew_period_seconds: self.auto_renew_period.as_secs() as i64,
        }))
    }
}

/// Accounts renew in steps the network is willing to schedule.
pub(crate) fn check_auto_renew_period(period: Duration) -> Result<()> {
    if (config::MIN_AUTO_RENEW_PERIOD..=config::MAX_AUTO_RENEW_PERIOD).contains(&period) {
        Ok(())
    } else {
        Err(Error::AutoRenewPeriod { period })
    }
}

impl<'a> Transaction<'a, CryptoCreateAccount> {
    /// The key that will control the new account.
    pub fn key(mut self, key: PublicKey) -> Self {
        self.kind_mut().key = Some(key);
        self
    }

    /// Amount moved from the payer into the new account.
    pub fn initial_balance(mut self, amount: u64) -> Self {
        self.kind_mut().initial_balance = amount;
        self
    }

    pub fn auto_renew_period(mut self, period: Duration) -> Self {
        self.kind_mut().auto_renew_period = period;
        self
    }
}
