//! Logical requests and responses exchanged with a node.
//!
//! These are transport-neutral: [`TcpChannel`](super::TcpChannel) frames
//! them as JSON-RPC, while the in-memory [`Emulator`](super::Emulator)
//! consumes them directly.

use serde::{Deserialize, Serialize};

use crate::id::{AccountId, TransactionId};
use crate::query::AccountInfo;
use crate::receipt::{TransactionReceipt, TransactionRecord};
use crate::status::Status;
use crate::transaction::SignedTransaction;

/// A request for a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Request {
    /// Submit a signed transaction.
    Transaction(SignedTransaction),
    /// Ask about network state.
    Query(QueryRequest),
}

/// A node's reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Response {
    /// Reply to [`Request::Transaction`].
    Transaction { precheck: Status },
    /// Reply to [`Request::Query`].
    Query(QueryResponse),
}

/// Which phase of the query protocol is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// Return the answer.
    AnswerOnly,
    /// Return only what the answer would cost.
    CostAnswer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub response_type: ResponseType,
    pub body: QueryBody,
}

/// The question being asked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryBody {
    AccountBalance { account_id: AccountId },
    AccountInfo { account_id: AccountId },
    /// Records of transactions the account paid for with
    /// `generate_record` set.
    AccountRecords { account_id: AccountId },
    TransactionReceipt { transaction_id: TransactionId },
    TransactionRecord { transaction_id: TransactionId },
}

impl QueryBody {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            QueryBody::AccountBalance { .. } => "account_balance",
            QueryBody::AccountInfo { .. } => "account_info",
            QueryBody::AccountRecords { .. } => "account_records",
            QueryBody::TransactionReceipt { .. } => "transaction_receipt",
            QueryBody::TransactionRecord { .. } => "transaction_record",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub precheck: Status,
    /// Echo of the requested phase.
    pub response_type: ResponseType,
    /// Fee for the answer phase. Only meaningful for [`ResponseType::CostAnswer`].
    pub cost: u64,
    /// Present when the node answered.
    pub answer: Option<Answer>,
}

/// A populated answer; the variant says which kind of query it answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    AccountBalance { account_id: AccountId, balance: u64 },
    AccountInfo(AccountInfo),
    AccountRecords { account_id: AccountId, records: Vec<TransactionRecord> },
    TransactionReceipt(TransactionReceipt),
    TransactionRecord(TransactionRecord),
}

impl Request {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Request::Transaction(_) => "transaction",
            Request::Query(query) => query.body.name(),
        }
    }
}
