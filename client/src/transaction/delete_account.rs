//! Account deletion.

use super::body::{CryptoDeleteAccountBody, TransactionData};
use super::{Transaction, TransactionKind};
use crate::error::{Error, Result};
use crate::id::AccountId;

/// Payload of an account-deletion transaction. The deleted account's key
/// signs after the payer; its balance moves to the transfer account.
///
/// A deleted account stays on the ledger, marked deleted, and can no
/// longer pay for, send or receive anything.
#[derive(Debug, Clone)]
pub struct CryptoDeleteAccount {
    delete_account_id: AccountId,
    transfer_account_id: Option<AccountId>,
}

impl CryptoDeleteAccount {
    pub fn new(delete_account_id: AccountId) -> Self {
        Self {
            delete_account_id,
            transfer_account_id: None,
        }
    }
}

impl TransactionKind for CryptoDeleteAccount {
    fn validate(&self) -> Result<()> {
        self.transfer_account_id
            .map(|_| ())
            .ok_or(Error::MissingField("transfer_account"))
    }

    fn to_data(&self) -> Result<TransactionData> {
        Ok(TransactionData::CryptoDeleteAccount(CryptoDeleteAccountBody {
            delete_account_id: self.delete_account_id,
            transfer_account_id: self
                .transfer_account_id
                .ok_or(Error::MissingField("transfer_account"))?,
        }))
    }
}

impl<'a> Transaction<'a, CryptoDeleteAccount> {
    /// The account that receives the remaining balance.
    pub fn transfer_to(mut self, account_id: AccountId) -> Self {
        self.kind_mut().transfer_account_id = Some(account_id);
        self
    }
}
