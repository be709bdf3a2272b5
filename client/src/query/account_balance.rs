//! Account balance lookup.

use super::QueryKind;
use crate::id::AccountId;
use crate::network::{Answer, QueryBody};

/// Asks for the current balance of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetAccountBalance(pub AccountId);

impl QueryKind for GetAccountBalance {
    type Answer = u64;

    const NAME: &'static str = "account balance";

    fn body(&self) -> QueryBody {
        QueryBody::AccountBalance { account_id: self.0 }
    }

    fn decode(answer: Answer) -> Option<u64> {
        match answer {
            Answer::AccountBalance { balance, .. } => Some(balance),
            _ => None,
        }
    }
}
