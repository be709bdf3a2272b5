//! Value transfers between accounts.

use super::body::{AccountAmount, CryptoTransferBody, TransactionData};
use super::{Transaction, TransactionKind};
use crate::error::{Error, Result};
use crate::id::AccountId;

/// Payload of a transfer transaction: signed amounts per account.
///
/// Entries may be added in any order and may repeat an account. The only
/// rule, checked at submission, is that all amounts sum to zero.
#[derive(Debug, Clone, Default)]
pub struct CryptoTransfer {
    transfers: Vec<AccountAmount>,
}

impl CryptoTransfer {
    /// Sum of every signed amount. Widened so the sum itself cannot overflow.
    pub fn net(&self) -> i128 {
        self.transfers.iter().map(|t| i128::from(t.amount)).sum()
    }

    pub fn transfers(&self) -> &[AccountAmount] {
        &self.transfers
    }
}

impl TransactionKind for CryptoTransfer {
    fn validate(&self) -> Result<()> {
        match self.net() {
            0 => Ok(()),
            sum => Err(Error::UnbalancedTransfer { sum }),
        }
    }

    fn to_data(&self) -> Result<TransactionData> {
        Ok(TransactionData::CryptoTransfer(CryptoTransferBody {
            transfers: self.transfers.clone(),
        }))
    }
}

impl<'a> Transaction<'a, CryptoTransfer> {
    /// Adds a leg. Negative amounts debit `account_id`, positive credit it.
    pub fn transfer(mut self, account_id: AccountId, amount: i64) -> Self {
        self.kind_mut()
            .transfers
            .push(AccountAmount { account_id, amount });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer(legs: &[(i64, i64)]) -> CryptoTransfer {
        CryptoTransfer {
            transfers: legs
                .iter()
                .map(|&(account, amount)| AccountAmount {
                    account_id: AccountId::simple(account),
                    amount,
                })
                .collect(),
        }
    }

    #[test]
    fn test_balanced_transfers_pass() {
        transfer(&[(2, -100), (5, 100)]).validate().unwrap();
        transfer(&[(5, 60), (2, -100), (6, 40)]).validate().unwrap();
        transfer(&[]).validate().unwrap();
    }

    #[test]
    fn test_unbalanced_transfer_reports_sum() {
        match transfer(&[(2, -100), (5, 50)]).validate() {
            Err(Error::UnbalancedTransfer { sum }) => assert_eq!(sum, -50),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_net_does_not_overflow() {
        let t = transfer(&[(2, i64::MAX), (5, i64::MAX)]);
        assert_eq!(t.net(), 2 * i128::from(i64::MAX));
        assert!(t.validate().is_err());

        let t = transfer(&[(2, i64::MIN), (5, i64::MAX), (6, 1)]);
        t.validate().unwrap();
    }
}
