//! Full transaction records.

use serde::{Deserialize, Serialize};

use super::TransactionReceipt;
use crate::id::{AccountId, TransactionId};
use crate::timestamp::Timestamp;
use crate::transaction::AccountAmount;

/// Everything the network remembers about a transaction that reached
/// consensus: the receipt plus what was charged and moved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub transaction_id: TransactionId,
    pub receipt: TransactionReceipt,
    /// SHA-384 of the signed transaction as submitted.
    #[serde(with = "hex")]
    pub transaction_hash: Vec<u8>,
    pub consensus_timestamp: Timestamp,
    pub memo: String,
    /// Fee actually charged to the payer.
    pub transaction_fee: u64,
    /// Net balance changes, fees included, one entry per account in
    /// account order.
    pub transfers: Vec<AccountAmount>,
}

impl TransactionRecord {
    /// Net change this transaction made to `account_id`, zero if untouched.
    pub fn net_change(&self, account_id: AccountId) -> i64 {
        self.transfers
            .iter()
            .filter(|leg| leg.account_id == account_id)
            .map(|leg| leg.amount)
            .sum()
    }
}
