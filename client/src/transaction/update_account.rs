//! Account updates: key rotation and auto-renew changes.

use std::time::Duration;

use super::body::{CryptoUpdateAccountBody, TransactionData};
use super::create_account::check_auto_renew_period;
use super::{Transaction, TransactionKind};
use crate::crypto::PublicKey;
use crate::error::Result;
use crate::id::AccountId;

/// Payload of an account-update transaction.
///
/// Besides the payer, the account's current key must sign. A key rotation
/// also needs a signature from the new key, after the current one.
#[derive(Debug, Clone)]
pub struct CryptoUpdateAccount {
    account_id: AccountId,
    key: Option<PublicKey>,
    auto_renew_period: Option<Duration>,
}

impl CryptoUpdateAccount {
    pub fn new(account_id: AccountId) -> Self {
        Self {
            account_id,
            key: None,
            auto_renew_period: None,
        }
    }
}

impl TransactionKind for CryptoUpdateAccount {
    fn validate(&self) -> Result<()> {
        match self.auto_renew_period {
            Some(period) => check_auto_renew_period(period),
            None => Ok(()),
        }
    }

    fn to_data(&self) -> Result<TransactionData> {
        Ok(TransactionData::CryptoUpdateAccount(CryptoUpdateAccountBody {
            account_id: self.account_id,
            key: self.key,
            auto_renew_period_seconds: self.auto_renew_period.map(|period| period.as_secs() as i64),
        }))
    }
}

impl<'a> Transaction<'a, CryptoUpdateAccount> {
    /// Replaces the key that controls the account.
    pub fn key(mut self, key: PublicKey) -> Self {
        self.kind_mut().key = Some(key);
        self
    }

    pub fn auto_renew_period(mut self, period: Duration) -> Self {
        self.kind_mut().auto_renew_period = Some(period);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::SecretKey;
    use crate::error::Error;

    #[test]
    fn test_untouched_fields_stay_unset() {
        let kind = CryptoUpdateAccount::new(AccountId::simple(7));
        kind.validate().unwrap();
        assert_eq!(
            kind.to_data().unwrap(),
            TransactionData::CryptoUpdateAccount(CryptoUpdateAccountBody {
                account_id: AccountId::simple(7),
                key: None,
                auto_renew_period_seconds: None,
            })
        );
    }

    #[test]
    fn test_payload() {
        let public = SecretKey::generate().public();
        let kind = CryptoUpdateAccount {
            key: Some(public),
            auto_renew_period: Some(Duration::from_secs(864_000)),
            ..CryptoUpdateAccount::new(AccountId::simple(7))
        };
        match kind.to_data().unwrap() {
            TransactionData::CryptoUpdateAccount(body) => {
                assert_eq!(body.key, Some(public));
                assert_eq!(body.auto_renew_period_seconds, Some(864_000));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_out_of_range_renewal_rejected() {
        let kind = CryptoUpdateAccount {
            auto_renew_period: Some(Duration::from_secs(60)),
            ..CryptoUpdateAccount::new(AccountId::simple(7))
        };
        assert!(matches!(kind.validate(), Err(Error::AutoRenewPeriod { .. })));
    }
}
