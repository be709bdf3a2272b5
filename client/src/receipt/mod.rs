//! Transaction receipts, the records behind them, and the resolver that
//! waits for them.

pub mod record;
pub mod resolver;

pub use record::TransactionRecord;
pub use resolver::{ReceiptOutcome, ReceiptResolver, ResolverState};

use serde::{Deserialize, Serialize};

use crate::id::AccountId;
use crate::status::Status;

/// Consensus outcome of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    /// [`Status::Unknown`] until consensus, then the final status.
    pub status: Status,
    /// The account a successful account creation produced.
    pub account_id: Option<AccountId>,
}

impl TransactionReceipt {
    /// A receipt for a transaction that has not reached consensus.
    pub fn pending() -> Self {
        Self {
            status: Status::Unknown,
            account_id: None,
        }
    }

    pub fn new(status: Status) -> Self {
        Self {
            status,
            account_id: None,
        }
    }

    /// Attaches a created account. Ignored unless the status is success.
    pub fn with_account_id(mut self, account_id: AccountId) -> Self {
        if self.status.is_success() {
            self.account_id = Some(account_id);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_only_on_success() {
        let created = TransactionReceipt::new(Status::Success).with_account_id(AccountId::simple(1001));
        assert_eq!(created.account_id, Some(AccountId::simple(1001)));

        let failed = TransactionReceipt::new(Status::InsufficientPayerBalance)
            .with_account_id(AccountId::simple(1001));
        assert_eq!(failed.account_id, None);
    }

    #[test]
    fn test_pending_receipt() {
        let receipt = TransactionReceipt::pending();
        assert!(receipt.status.is_pending());
        assert!(receipt.account_id.is_none());
    }
}
