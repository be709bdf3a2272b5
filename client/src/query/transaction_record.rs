//! Record lookup for one transaction.

use super::QueryKind;
use crate::id::TransactionId;
use crate::network::{Answer, QueryBody};
use crate::receipt::TransactionRecord;

/// Asks for the full record of a transaction. Until the transaction
/// reaches consensus the node answers [`Status::RecordNotFound`].
///
/// [`Status::RecordNotFound`]: crate::Status::RecordNotFound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetTransactionRecord(pub TransactionId);

impl QueryKind for GetTransactionRecord {
    type Answer = TransactionRecord;

    const NAME: &'static str = "transaction record";

    fn body(&self) -> QueryBody {
        QueryBody::TransactionRecord { transaction_id: self.0 }
    }

    fn decode(answer: Answer) -> Option<TransactionRecord> {
        match answer {
            Answer::TransactionRecord(record) => Some(record),
            _ => None,
        }
    }
}
