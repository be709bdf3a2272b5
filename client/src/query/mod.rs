//! # Queries
//!
//! A [`Query`] is bound to one [`Connection`] and one target. Each call is
//! an independent round trip, so the same query can be sent repeatedly
//! (the receipt resolver polls this way).
//!
//! The protocol has two phases:
//!
//! - [`Query::cost`] asks what the answer would cost.
//! - [`Query::send`] asks for the answer itself.
//!
//! Paying for an answer is the caller's business; this layer only reports
//! the node's price.

pub mod account_balance;
pub mod account_info;
pub mod account_records;
pub mod transaction_receipt;
pub mod transaction_record;

pub use account_balance::GetAccountBalance;
pub use account_info::{AccountInfo, GetAccountInfo};
pub use account_records::GetAccountRecords;
pub use transaction_receipt::GetTransactionReceipt;
pub use transaction_record::GetTransactionRecord;

use crate::error::{Error, Result};
use crate::network::{Answer, Connection, QueryBody, QueryRequest, Request, Response, ResponseType};
use crate::status::Status;

/// One kind of question a node can answer.
pub trait QueryKind {
    /// Decoded payload type.
    type Answer;

    /// Short name for logs and error messages.
    const NAME: &'static str;

    /// The question on the wire.
    fn body(&self) -> QueryBody;

    /// Extracts this kind's payload, or `None` if the node answered a
    /// different question.
    fn decode(answer: Answer) -> Option<Self::Answer>;
}

/// Typed reply to [`Query::send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResponse<T> {
    pub precheck: Status,
    /// The phase the node answered.
    pub response_type: ResponseType,
    pub cost: u64,
    /// Present when the precheck is OK and the node answered.
    pub answer: Option<T>,
}

/// Reply to [`Query::cost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryCost {
    pub precheck: Status,
    pub cost: u64,
}

/// A request bound to a connection and a target.
#[must_use = "a query does nothing until sent"]
pub struct Query<'a, Q> {
    connection: &'a Connection,
    kind: Q,
}

impl<'a, Q: QueryKind> Query<'a, Q> {
    pub fn new(connection: &'a Connection, kind: Q) -> Self {
        Self { connection, kind }
    }

    pub fn kind(&self) -> &Q {
        &self.kind
    }

    /// Answer phase.
    pub async fn send(&self) -> Result<QueryResponse<Q::Answer>> {
        let raw = self.round_trip(ResponseType::AnswerOnly).await?;
        let answer = match raw.answer {
            Some(answer) => Some(Q::decode(answer).ok_or(Error::UnexpectedResponse { expected: Q::NAME })?),
            None => None,
        };
        Ok(QueryResponse {
            precheck: raw.precheck,
            response_type: raw.response_type,
            cost: raw.cost,
            answer,
        })
    }

    /// Cost phase.
    pub async fn cost(&self) -> Result<QueryCost> {
        let raw = self.round_trip(ResponseType::CostAnswer).await?;
        Ok(QueryCost {
            precheck: raw.precheck,
            cost: raw.cost,
        })
    }

    /// Answer phase, treating a non-OK precheck as [`Error::PreCheck`].
    pub async fn answer(&self) -> Result<Q::Answer> {
        let response = self.send().await?;
        if !response.precheck.is_ok() {
            return Err(Error::PreCheck(response.precheck));
        }
        response.answer.ok_or(Error::UnexpectedResponse { expected: Q::NAME })
    }

    async fn round_trip(&self, response_type: ResponseType) -> Result<crate::network::QueryResponse> {
        let request = Request::Query(QueryRequest {
            response_type,
            body: self.kind.body(),
        });
        match self.connection.call(request).await? {
            Response::Query(response) => {
                tracing::debug!(
                    query = Q::NAME,
                    ?response_type,
                    precheck = %response.precheck,
                    cost = response.cost,
                    "query answered"
                );
                Ok(response)
            }
            Response::Transaction { .. } => Err(Error::UnexpectedResponse { expected: Q::NAME }),
        }
    }
}
