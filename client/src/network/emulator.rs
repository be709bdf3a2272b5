//! In-memory ledger that answers client requests directly.
//!
//! [`Emulator`] implements [`Channel`], so a [`Connection`] built over it
//! behaves like one talking to a real node, with no sockets involved. The
//! same request handler backs the `shardline-node` development server.
//!
//! # Differences with a real network
//!
//! * Consensus is immediate: an accepted transaction's effects are applied
//!   on submission. Only the receipt's *visibility* is delayed, by
//!   [`EmulatorConfig::consensus_polls`] answer-phase receipt polls. Records
//!   become visible together with the final receipt.
//!
//! * Fees are flat: every accepted transaction is charged
//!   [`EmulatorConfig::transaction_fee`], credited to the receiving node
//!   account when that account exists.
//!
//! * Signatures are checked positionally. The first signature must be the
//!   payer's. The following ones belong, in order, to the debited accounts
//!   of a transfer, or to the account being updated or deleted. A key
//!   rotation also needs the new key last. Extra signatures are ignored.
//!
//! * Receipts and records are kept for [`EmulatorConfig::receipt_retention`]
//!   past the end of their transaction's validity window, then dropped.
//!   By then a resubmission fails as expired, so duplicate detection does
//!   not depend on them.
//!
//! [`Connection`]: super::Connection

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::message::{Answer, QueryBody, QueryRequest, QueryResponse, Request, Response, ResponseType};
use super::Channel;
use crate::config;
use crate::crypto::PublicKey;
use crate::error::TransportError;
use crate::id::{AccountId, TransactionId};
use crate::query::AccountInfo;
use crate::receipt::{TransactionReceipt, TransactionRecord};
use crate::status::Status;
use crate::timestamp::Timestamp;
use crate::transaction::{
    AccountAmount, CryptoCreateAccountBody, CryptoDeleteAccountBody, CryptoTransferBody, CryptoUpdateAccountBody,
    SignedTransaction, TransactionBody, TransactionData,
};

/// How far in the future a valid start may lie before the node rejects it.
const MAX_VALID_START_AHEAD: Duration = Duration::from_secs(10);

/// Emulator settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmulatorConfig {
    /// Node accounts this emulator accepts transactions for.
    pub node_accounts: Vec<AccountId>,
    /// Answer-phase receipt polls that report [`Status::Unknown`] before the
    /// final receipt is revealed. `None` means consensus is never reached.
    pub consensus_polls: Option<u32>,
    /// Flat fee charged per accepted transaction. Transactions authorizing
    /// less fail precheck with [`Status::InsufficientTxFee`].
    pub transaction_fee: u64,
    /// Price quoted in the cost phase of a paid query.
    pub query_cost: u64,
    /// Account number assigned to the first account created through a
    /// transaction.
    pub first_account_number: i64,
    /// How long receipts and records outlive their transaction's validity
    /// window.
    pub receipt_retention: Duration,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            node_accounts: vec![AccountId::simple(3)],
            consensus_polls: Some(1),
            transaction_fee: config::DEFAULT_TRANSACTION_FEE,
            query_cost: 25,
            first_account_number: 1001,
            receipt_retention: config::RECEIPT_RETENTION,
        }
    }
}

/// An in-memory ledger. Clones share state.
#[derive(Clone)]
pub struct Emulator {
    config: Arc<EmulatorConfig>,
    state: Arc<Mutex<EmulatorState>>,
}

struct EmulatorState {
    accounts: HashMap<AccountId, Account>,
    receipts: HashMap<TransactionId, PendingReceipt>,
    next_account_number: i64,
    last_consensus: Timestamp,
    /// Net balance changes of the transaction being applied.
    journal: BTreeMap<AccountId, i128>,
    offline: bool,
    requests: u64,
}

struct Account {
    key: PublicKey,
    balance: u64,
    auto_renew_period_seconds: i64,
    expiration_time: Timestamp,
    deleted: bool,
}

impl Account {
    fn new(key: PublicKey, balance: u64, auto_renew_period: Duration, now: Timestamp) -> Self {
        Self {
            key,
            balance,
            auto_renew_period_seconds: auto_renew_period.as_secs() as i64,
            expiration_time: now.saturating_add(auto_renew_period),
            deleted: false,
        }
    }

    fn info(&self, account_id: AccountId) -> AccountInfo {
        AccountInfo {
            account_id,
            key: self.key,
            balance: self.balance,
            deleted: self.deleted,
            auto_renew_period_seconds: self.auto_renew_period_seconds,
            expiration_time: self.expiration_time,
        }
    }
}

struct PendingReceipt {
    record: TransactionRecord,
    /// Listed in the payer's account records.
    listed: bool,
    /// End of the transaction's validity window.
    expires_at: Timestamp,
    /// Polls left before the receipt is revealed; `None` never reveals it.
    remaining_polls: Option<u32>,
}

impl PendingReceipt {
    fn revealed(&self) -> bool {
        self.remaining_polls == Some(0)
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new(EmulatorConfig::default())
    }
}

impl Emulator {
    pub fn new(config: EmulatorConfig) -> Self {
        let state = EmulatorState {
            accounts: HashMap::new(),
            receipts: HashMap::new(),
            next_account_number: config.first_account_number,
            last_consensus: Timestamp::new(0, 0),
            journal: BTreeMap::new(),
            offline: false,
            requests: 0,
        };
        Self {
            config: Arc::new(config),
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn config(&self) -> &EmulatorConfig {
        &self.config
    }

    /// Registers an account directly, bypassing transactions. Replaces any
    /// existing account with the same id.
    pub fn create_account(&self, id: AccountId, key: PublicKey, balance: u64) {
        let account = Account::new(key, balance, config::DEFAULT_AUTO_RENEW_PERIOD, Timestamp::now());
        self.state.lock().accounts.insert(id, account);
    }

    pub fn balance(&self, id: AccountId) -> Option<u64> {
        self.state.lock().accounts.get(&id).map(|account| account.balance)
    }

    /// Overwrites the balance of an existing account. Returns `false` if
    /// the account does not exist.
    pub fn set_balance(&self, id: AccountId, balance: u64) -> bool {
        match self.state.lock().accounts.get_mut(&id) {
            Some(account) => {
                account.balance = balance;
                true
            }
            None => false,
        }
    }

    /// While offline, every call fails with [`TransportError::Unreachable`].
    pub fn set_offline(&self, offline: bool) {
        self.state.lock().offline = offline;
    }

    /// Number of requests that reached the emulator, online or not.
    pub fn request_count(&self) -> u64 {
        self.state.lock().requests
    }

    /// Receipts currently retained.
    pub fn receipt_count(&self) -> usize {
        self.state.lock().receipts.len()
    }

    /// Answers one request.
    pub fn handle(&self, request: Request) -> Response {
        let mut state = self.state.lock();
        match request {
            Request::Transaction(tx) => Response::Transaction {
                precheck: self.submit(&mut state, &tx),
            },
            Request::Query(query) => Response::Query(self.query(&mut state, query)),
        }
    }

    // -----------------------------------------------------------------------
    // Transactions
    // -----------------------------------------------------------------------

    fn submit(&self, state: &mut EmulatorState, tx: &SignedTransaction) -> Status {
        let now = Timestamp::now();
        state.prune_receipts(now, self.config.receipt_retention);

        let body = match self.precheck(state, tx, now) {
            Ok(body) => body,
            Err(status) => {
                tracing::debug!(%status, "emulator rejected transaction at precheck");
                return status;
            }
        };

        let id = body.transaction_id;
        let payer = id.account_id;
        let fee = self.config.transaction_fee;
        state.journal.clear();
        state.debit(payer, fee);
        state.credit(body.node_account_id, fee);

        let receipt = match &body.data {
            TransactionData::CryptoCreateAccount(create) => state.create(payer, create, now),
            TransactionData::CryptoTransfer(transfer) => state.transfer(transfer),
            TransactionData::CryptoUpdateAccount(update) => state.update(update),
            TransactionData::CryptoDeleteAccount(delete) => state.delete(delete),
        };
        let record = TransactionRecord {
            transaction_id: id,
            receipt,
            transaction_hash: tx.hash().map(|hash| hash.to_vec()).unwrap_or_default(),
            consensus_timestamp: state.next_consensus(now),
            memo: body.memo.clone(),
            transaction_fee: fee,
            transfers: state.take_journal(),
        };
        tracing::debug!(
            transaction_id = %id,
            hash = %hex::encode(&record.transaction_hash),
            kind = body.data.name(),
            status = %receipt.status,
            "emulator applied transaction"
        );

        let valid_for = Duration::from_secs(body.valid_duration_seconds as u64);
        state.receipts.insert(
            id,
            PendingReceipt {
                record,
                listed: body.generate_record,
                expires_at: id.valid_start.saturating_add(valid_for),
                remaining_polls: self.config.consensus_polls,
            },
        );
        Status::Ok
    }

    fn precheck(&self, state: &EmulatorState, tx: &SignedTransaction, now: Timestamp) -> Result<TransactionBody, Status> {
        let body = tx.body().map_err(|_| Status::InvalidTransactionBody)?;

        if !self.config.node_accounts.contains(&body.node_account_id) {
            return Err(Status::InvalidNodeAccount);
        }
        let payer = state
            .accounts
            .get(&body.transaction_id.account_id)
            .ok_or(Status::PayerAccountNotFound)?;
        if payer.deleted {
            return Err(Status::AccountDeleted);
        }

        let min = config::MIN_TRANSACTION_VALID_DURATION.as_secs() as i64;
        let max = config::MAX_TRANSACTION_VALID_DURATION.as_secs() as i64;
        if !(min..=max).contains(&body.valid_duration_seconds) {
            return Err(Status::InvalidTransactionDuration);
        }

        let start = body.transaction_id.valid_start;
        if start > now.saturating_add(MAX_VALID_START_AHEAD) {
            return Err(Status::InvalidTransactionStart);
        }
        let valid_for = Duration::from_secs(body.valid_duration_seconds as u64);
        if start.saturating_add(valid_for) <= now {
            return Err(Status::TransactionExpired);
        }

        if body.memo.len() > config::MAX_MEMO_LENGTH {
            return Err(Status::MemoTooLong);
        }
        if body.transaction_fee < self.config.transaction_fee {
            return Err(Status::InsufficientTxFee);
        }
        if state.receipts.contains_key(&body.transaction_id) {
            return Err(Status::DuplicateTransaction);
        }

        let key_of = |id: &AccountId| state.accounts.get(id).map(|account| account.key);
        let mut required = vec![payer.key];
        match &body.data {
            TransactionData::CryptoCreateAccount(_) => {}
            TransactionData::CryptoTransfer(transfer) => required.extend(
                transfer
                    .transfers
                    .iter()
                    .filter(|leg| leg.amount < 0)
                    .filter_map(|leg| key_of(&leg.account_id)),
            ),
            TransactionData::CryptoUpdateAccount(update) => {
                required.extend(key_of(&update.account_id));
                required.extend(update.key);
            }
            TransactionData::CryptoDeleteAccount(delete) => required.extend(key_of(&delete.delete_account_id)),
        }
        let signed = required.len() <= tx.signatures.len()
            && required
                .iter()
                .zip(&tx.signatures)
                .all(|(key, sig)| key.verify(&tx.body_bytes, sig));
        if !signed {
            return Err(Status::InvalidSignature);
        }

        if payer.balance < self.config.transaction_fee {
            return Err(Status::InsufficientPayerBalance);
        }
        Ok(body)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    fn query(&self, state: &mut EmulatorState, query: QueryRequest) -> QueryResponse {
        let response_type = query.response_type;
        let reply = |precheck, cost, answer| QueryResponse {
            precheck,
            response_type,
            cost,
            answer,
        };
        let quote = || reply(Status::Ok, self.config.query_cost, None);

        match (query.body, response_type) {
            (QueryBody::AccountBalance { account_id }, response_type) => {
                let account = match state.live_account(account_id) {
                    Ok(account) => account,
                    Err(status) => return reply(status, 0, None),
                };
                match response_type {
                    ResponseType::CostAnswer => quote(),
                    ResponseType::AnswerOnly => reply(
                        Status::Ok,
                        0,
                        Some(Answer::AccountBalance {
                            account_id,
                            balance: account.balance,
                        }),
                    ),
                }
            }
            (QueryBody::AccountInfo { account_id }, response_type) => {
                let Some(account) = state.accounts.get(&account_id) else {
                    return reply(Status::InvalidAccountId, 0, None);
                };
                match response_type {
                    ResponseType::CostAnswer => quote(),
                    ResponseType::AnswerOnly => reply(Status::Ok, 0, Some(Answer::AccountInfo(account.info(account_id)))),
                }
            }
            (QueryBody::AccountRecords { account_id }, response_type) => {
                if !state.accounts.contains_key(&account_id) {
                    return reply(Status::InvalidAccountId, 0, None);
                }
                match response_type {
                    ResponseType::CostAnswer => quote(),
                    ResponseType::AnswerOnly => {
                        let records = state.account_records(account_id);
                        reply(Status::Ok, 0, Some(Answer::AccountRecords { account_id, records }))
                    }
                }
            }
            (QueryBody::TransactionReceipt { .. }, ResponseType::CostAnswer) => reply(Status::Ok, 0, None),
            (QueryBody::TransactionReceipt { transaction_id }, ResponseType::AnswerOnly) => {
                let Some(pending) = state.receipts.get_mut(&transaction_id) else {
                    return reply(Status::ReceiptNotFound, 0, None);
                };
                let receipt = match &mut pending.remaining_polls {
                    Some(0) => pending.record.receipt,
                    Some(remaining) => {
                        *remaining -= 1;
                        TransactionReceipt::pending()
                    }
                    None => TransactionReceipt::pending(),
                };
                reply(Status::Ok, 0, Some(Answer::TransactionReceipt(receipt)))
            }
            (QueryBody::TransactionRecord { .. }, ResponseType::CostAnswer) => quote(),
            (QueryBody::TransactionRecord { transaction_id }, ResponseType::AnswerOnly) => {
                match state.receipts.get(&transaction_id) {
                    Some(pending) if pending.revealed() => {
                        reply(Status::Ok, 0, Some(Answer::TransactionRecord(pending.record.clone())))
                    }
                    _ => reply(Status::RecordNotFound, 0, None),
                }
            }
        }
    }
}

impl EmulatorState {
    fn live_account(&self, id: AccountId) -> Result<&Account, Status> {
        match self.accounts.get(&id) {
            None => Err(Status::InvalidAccountId),
            Some(account) if account.deleted => Err(Status::AccountDeleted),
            Some(account) => Ok(account),
        }
    }

    fn debit(&mut self, id: AccountId, amount: u64) {
        if let Some(account) = self.accounts.get_mut(&id) {
            let taken = amount.min(account.balance);
            account.balance -= taken;
            *self.journal.entry(id).or_default() -= i128::from(taken);
        }
    }

    fn credit(&mut self, id: AccountId, amount: u64) {
        if let Some(account) = self.accounts.get_mut(&id) {
            let before = account.balance;
            account.balance = before.saturating_add(amount);
            *self.journal.entry(id).or_default() += i128::from(account.balance - before);
        }
    }

    fn take_journal(&mut self) -> Vec<AccountAmount> {
        std::mem::take(&mut self.journal)
            .into_iter()
            .filter(|&(_, delta)| delta != 0)
            .filter_map(|(account_id, delta)| {
                let amount = i64::try_from(delta).ok()?;
                Some(AccountAmount { account_id, amount })
            })
            .collect()
    }

    /// Strictly increasing consensus timestamps, tracking the wall clock.
    fn next_consensus(&mut self, now: Timestamp) -> Timestamp {
        let next = if now > self.last_consensus {
            now
        } else {
            self.last_consensus.saturating_add(Duration::from_nanos(1))
        };
        self.last_consensus = next;
        next
    }

    fn prune_receipts(&mut self, now: Timestamp, retention: Duration) {
        let before = self.receipts.len();
        self.receipts
            .retain(|_, pending| pending.expires_at.saturating_add(retention) > now);
        let pruned = before - self.receipts.len();
        if pruned > 0 {
            tracing::debug!(pruned, retained = self.receipts.len(), "emulator dropped expired receipts");
        }
    }

    fn account_records(&self, account_id: AccountId) -> Vec<TransactionRecord> {
        let mut records: Vec<TransactionRecord> = self
            .receipts
            .values()
            .filter(|pending| pending.listed && pending.revealed())
            .filter(|pending| pending.record.transaction_id.account_id == account_id)
            .map(|pending| pending.record.clone())
            .collect();
        records.sort_by_key(|record| record.consensus_timestamp);
        records
    }

    fn create(&mut self, payer: AccountId, create: &CryptoCreateAccountBody, now: Timestamp) -> TransactionReceipt {
        let Some(period) = auto_renew_period(create.auto_renew_period_seconds) else {
            return TransactionReceipt::new(Status::AutoRenewDurationNotInRange);
        };
        let funded = self
            .accounts
            .get(&payer)
            .is_some_and(|account| account.balance >= create.initial_balance);
        if !funded {
            return TransactionReceipt::new(Status::InsufficientPayerBalance);
        }
        self.debit(payer, create.initial_balance);

        let id = AccountId::simple(self.next_account_number);
        self.next_account_number += 1;
        self.accounts.insert(id, Account::new(create.key, 0, period, now));
        self.credit(id, create.initial_balance);
        TransactionReceipt::new(Status::Success).with_account_id(id)
    }

    fn transfer(&mut self, transfer: &CryptoTransferBody) -> TransactionReceipt {
        let mut net: BTreeMap<AccountId, i128> = BTreeMap::new();
        for leg in &transfer.transfers {
            *net.entry(leg.account_id).or_default() += i128::from(leg.amount);
        }
        if net.values().sum::<i128>() != 0 {
            return TransactionReceipt::new(Status::InvalidAccountAmounts);
        }

        let mut updated = Vec::with_capacity(net.len());
        for (&id, &delta) in &net {
            let account = match self.live_account(id) {
                Ok(account) => account,
                Err(status) => return TransactionReceipt::new(status),
            };
            let balance = i128::from(account.balance) + delta;
            if balance < 0 {
                return TransactionReceipt::new(Status::InsufficientAccountBalance);
            }
            let Ok(balance) = u64::try_from(balance) else {
                return TransactionReceipt::new(Status::InvalidAccountAmounts);
            };
            updated.push((id, balance, delta));
        }

        for (id, balance, delta) in updated {
            if let Some(account) = self.accounts.get_mut(&id) {
                account.balance = balance;
                *self.journal.entry(id).or_default() += delta;
            }
        }
        TransactionReceipt::new(Status::Success)
    }

    fn update(&mut self, update: &CryptoUpdateAccountBody) -> TransactionReceipt {
        if let Err(status) = self.live_account(update.account_id) {
            return TransactionReceipt::new(status);
        }
        let period = match update.auto_renew_period_seconds.map(auto_renew_period) {
            Some(None) => return TransactionReceipt::new(Status::AutoRenewDurationNotInRange),
            Some(Some(period)) => Some(period),
            None => None,
        };
        if let Some(account) = self.accounts.get_mut(&update.account_id) {
            if let Some(key) = update.key {
                account.key = key;
            }
            if let Some(period) = period {
                account.auto_renew_period_seconds = period.as_secs() as i64;
            }
        }
        TransactionReceipt::new(Status::Success)
    }

    fn delete(&mut self, delete: &CryptoDeleteAccountBody) -> TransactionReceipt {
        if delete.delete_account_id == delete.transfer_account_id {
            return TransactionReceipt::new(Status::TransferAccountSameAsDeleteAccount);
        }
        let balance = match self.live_account(delete.delete_account_id) {
            Ok(account) => account.balance,
            Err(status) => return TransactionReceipt::new(status),
        };
        if let Err(status) = self.live_account(delete.transfer_account_id) {
            return TransactionReceipt::new(status);
        }

        self.debit(delete.delete_account_id, balance);
        self.credit(delete.transfer_account_id, balance);
        if let Some(account) = self.accounts.get_mut(&delete.delete_account_id) {
            account.deleted = true;
        }
        TransactionReceipt::new(Status::Success)
    }
}

/// The period, if the network accepts it.
fn auto_renew_period(seconds: i64) -> Option<Duration> {
    let period = Duration::from_secs(u64::try_from(seconds).ok()?);
    (config::MIN_AUTO_RENEW_PERIOD..=config::MAX_AUTO_RENEW_PERIOD)
        .contains(&period)
        .then_some(period)
}

#[async_trait]
impl Channel for Emulator {
    fn address(&self) -> &str {
        "emulator"
    }

    async fn call(&self, request: Request) -> Result<Response, TransportError> {
        {
            let mut state = self.state.lock();
            state.requests += 1;
            if state.offline {
                return Err(TransportError::Unreachable);
            }
        }
        Ok(self.handle(request))
    }

    async fn close(&self) {}
}
