//! Receipt lookup.

use super::QueryKind;
use crate::id::TransactionId;
use crate::network::{Answer, QueryBody};
use crate::receipt::TransactionReceipt;

/// Asks for the receipt of a submitted transaction. Sent once, it reports
/// whatever the node knows right now; [`ReceiptResolver`] keeps asking
/// until the answer is final.
///
/// [`ReceiptResolver`]: crate::receipt::ReceiptResolver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetTransactionReceipt(pub TransactionId);

impl QueryKind for GetTransactionReceipt {
    type Answer = TransactionReceipt;

    const NAME: &'static str = "transaction receipt";

    fn body(&self) -> QueryBody {
        QueryBody::TransactionReceipt { transaction_id: self.0 }
    }

    fn decode(answer: Answer) -> Option<TransactionReceipt> {
        match answer {
            Answer::TransactionReceipt(receipt) => Some(receipt),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::AccountId;
    use crate::network::{Connection, Emulator};
    use crate::status::Status;

    #[test]
    fn test_decode_rejects_other_answers() {
        let wrong = Answer::AccountBalance {
            account_id: AccountId::simple(2),
            balance: 1,
        };
        assert!(GetTransactionReceipt::decode(wrong).is_none());
    }

    #[tokio::test]
    async fn test_unknown_transaction_is_receipt_not_found() {
        let connection = Connection::with_channel(Emulator::default());
        let response = connection
            .get_transaction_receipt(TransactionId::generate(AccountId::simple(2)))
            .send()
            .await
            .unwrap();
        assert_eq!(response.precheck, Status::ReceiptNotFound);
        assert!(response.answer.is_none());
    }

    #[tokio::test]
    async fn test_receipt_queries_are_free() {
        let connection = Connection::with_channel(Emulator::default());
        let cost = connection
            .get_transaction_receipt(TransactionId::generate(AccountId::simple(2)))
            .cost()
            .await
            .unwrap();
        assert_eq!(cost.cost, 0);
    }
}
