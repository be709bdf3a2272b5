//! # Receipt Resolution
//!
//! After a node accepts a transaction (precheck `Ok`), consensus still has
//! to run. The [`ReceiptResolver`] turns that into a single awaitable call
//! by polling the receipt query until the answer is final:
//!
//! ```text
//! Submitted ──poll──▶ Polling ──final status──▶ Resolved(Success | Failure)
//!                      │  ▲
//!              pending │  │ backoff delay
//!                      ▼  │
//!                     (wait) ──budget spent──▶ Resolved(Unresolved)
//! ```
//!
//! Delays follow the configured [`BackoffPolicy`]. The policy also bounds
//! the Polling state by poll count and elapsed time; when either runs out
//! the outcome is [`ReceiptOutcome::Unresolved`], which means "finality
//! unknown", not "failed".
//!
//! Transport errors stop resolution and are returned as errors. The
//! resolver never resubmits the transaction.

use std::time::Duration;

use tokio::time::Instant;

use super::TransactionReceipt;
use crate::config::BackoffPolicy;
use crate::error::{Error, Result};
use crate::id::{AccountId, TransactionId};
use crate::network::Connection;
use crate::query::{GetTransactionReceipt, Query, QueryResponse};
use crate::status::Status;

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// How resolution ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiptOutcome {
    /// Consensus reached with status `Success`.
    Success(TransactionReceipt),
    /// A definite failure. `receipt` is absent when the node refused the
    /// receipt query itself.
    Failure {
        status: Status,
        receipt: Option<TransactionReceipt>,
    },
    /// The budget ran out while the transaction was still pending.
    Unresolved { polls: u32, elapsed: Duration },
}

impl ReceiptOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ReceiptOutcome::Success(_))
    }

    /// The final status, if there is one.
    pub fn status(&self) -> Option<Status> {
        match self {
            ReceiptOutcome::Success(receipt) => Some(receipt.status),
            ReceiptOutcome::Failure { status, .. } => Some(*status),
            ReceiptOutcome::Unresolved { .. } => None,
        }
    }

    /// The account created by a successful creation transaction.
    pub fn account_id(&self) -> Option<AccountId> {
        match self {
            ReceiptOutcome::Success(receipt) => receipt.account_id,
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// State Machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverState {
    /// No poll issued yet.
    Submitted,
    /// At least one poll issued; the last one said "not yet".
    Polling { attempt: u32 },
    /// Terminal. Never left once entered.
    Resolved(ReceiptOutcome),
}

/// What one poll told us.
enum Step {
    Pending,
    Done(ReceiptOutcome),
}

/// Polls for one transaction's receipt until it is final or the budget is
/// spent.
///
/// Meant for transactions whose precheck was `Ok`; for anything else the
/// node has no receipt and the resolver reports `ReceiptNotFound` polls
/// until the budget runs out.
pub struct ReceiptResolver<'a> {
    query: Query<'a, GetTransactionReceipt>,
    policy: BackoffPolicy,
    state: ResolverState,
    polls: u32,
    pending_polls: u32,
    started_at: Option<Instant>,
}

impl<'a> ReceiptResolver<'a> {
    pub fn new(connection: &'a Connection, transaction_id: TransactionId) -> Self {
        Self {
            query: connection.get_transaction_receipt(transaction_id),
            policy: BackoffPolicy::default(),
            state: ResolverState::Submitted,
            polls: 0,
            pending_polls: 0,
            started_at: None,
        }
    }

    pub fn with_policy(mut self, policy: BackoffPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn transaction_id(&self) -> TransactionId {
        self.query.kind().0
    }

    pub fn state(&self) -> &ResolverState {
        &self.state
    }

    /// Polls issued so far.
    pub fn polls(&self) -> u32 {
        self.polls
    }

    /// Polls that came back "still processing".
    pub fn pending_polls(&self) -> u32 {
        self.pending_polls
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, ResolverState::Resolved(_))
    }

    /// Issues one poll and advances the state. Returns the outcome once
    /// terminal; a resolved resolver returns its outcome without polling.
    pub async fn poll(&mut self) -> Result<Option<ReceiptOutcome>> {
        if let ResolverState::Resolved(outcome) = &self.state {
            return Ok(Some(outcome.clone()));
        }
        let started_at = *self.started_at.get_or_insert_with(Instant::now);

        self.polls += 1;
        self.state = ResolverState::Polling {
            attempt: self.polls,
        };
        let response = self.query.send().await?;

        let outcome = match classify(response)? {
            Step::Done(outcome) => outcome,
            Step::Pending => {
                self.pending_polls += 1;
                let elapsed = started_at.elapsed();
                if self.polls < self.policy.max_polls && elapsed < self.policy.max_elapsed {
                    tracing::debug!(
                        transaction_id = %self.transaction_id(),
                        poll = self.polls,
                        "receipt not final yet"
                    );
                    return Ok(None);
                }
                tracing::warn!(
                    transaction_id = %self.transaction_id(),
                    polls = self.polls,
                    ?elapsed,
                    "gave up waiting for receipt"
                );
                ReceiptOutcome::Unresolved {
                    polls: self.polls,
                    elapsed,
                }
            }
        };

        if let Some(status) = outcome.status() {
            tracing::info!(
                transaction_id = %self.transaction_id(),
                %status,
                polls = self.polls,
                "receipt resolved"
            );
        }
        self.state = ResolverState::Resolved(outcome.clone());
        Ok(Some(outcome))
    }

    /// Polls with backoff until the outcome is known.
    pub async fn resolve(mut self) -> Result<ReceiptOutcome> {
        loop {
            if let Some(outcome) = self.poll().await? {
                return Ok(outcome);
            }
            let elapsed = self.started_at.map(|t| t.elapsed()).unwrap_or_default();
            let delay = self
                .policy
                .delay_for(self.pending_polls)
                .min(self.policy.max_elapsed.saturating_sub(elapsed));
            tracing::trace!(
                transaction_id = %self.transaction_id(),
                delay_ms = delay.as_millis() as u64,
                "waiting before next receipt poll"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Resolves several transactions concurrently. Results come back in
    /// input order.
    pub async fn resolve_all<I>(resolvers: I) -> Vec<Result<ReceiptOutcome>>
    where
        I: IntoIterator<Item = ReceiptResolver<'a>>,
    {
        futures::future::join_all(resolvers.into_iter().map(ReceiptResolver::resolve)).await
    }
}

fn classify(response: QueryResponse<TransactionReceipt>) -> Result<Step> {
    let precheck = response.precheck;
    if precheck.is_transient() {
        return Ok(Step::Pending);
    }
    if !precheck.is_ok() {
        return Ok(Step::Done(ReceiptOutcome::Failure {
            status: precheck,
            receipt: None,
        }));
    }
    let receipt = response.answer.ok_or(Error::UnexpectedResponse {
        expected: "transaction receipt",
    })?;
    Ok(match receipt.status {
        status if status.is_pending() => Step::Pending,
        Status::Success => Step::Done(ReceiptOutcome::Success(receipt)),
        status => Step::Done(ReceiptOutcome::Failure {
            status,
            receipt: Some(receipt),
        }),
    })
}
