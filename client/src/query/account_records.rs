//! Record history of a paying account.

use super::QueryKind;
use crate::id::AccountId;
use crate::network::{Answer, QueryBody};
use crate::receipt::TransactionRecord;

/// Asks for the records of recent transactions an account paid for with
/// `generate_record` set, oldest consensus first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetAccountRecords(pub AccountId);

impl QueryKind for GetAccountRecords {
    type Answer = Vec<TransactionRecord>;

    const NAME: &'static str = "account records";

    fn body(&self) -> QueryBody {
        QueryBody::AccountRecords { account_id: self.0 }
    }

    fn decode(answer: Answer) -> Option<Vec<TransactionRecord>> {
        match answer {
            Answer::AccountRecords { records, .. } => Some(records),
            _ => None,
        }
    }
}
