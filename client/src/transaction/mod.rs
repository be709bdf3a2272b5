//! # Transactions
//!
//! A [`Transaction`] is a builder bound to a [`Connection`]. It carries the
//! header every transaction shares (operator, node, memo, fee, id, and the
//! ordered signature list) plus a kind-specific payload `K`:
//!
//! - [`CryptoCreateAccount`]: key and initial balance of a new account.
//! - [`CryptoTransfer`]: signed amounts that must net to zero.
//! - [`CryptoUpdateAccount`]: key rotation and auto-renew changes.
//! - [`CryptoDeleteAccount`]: marks an account deleted and sweeps its
//!   balance elsewhere.
//!
//! ```rust,no_run
//! # async fn demo(connection: &shardline_client::Connection, operator_key: &shardline_client::SecretKey) -> shardline_client::Result<()> {
//! use shardline_client::AccountId;
//!
//! let response = connection
//!     .crypto_transfer()
//!     .operator(AccountId::simple(2))
//!     .node(AccountId::simple(3))
//!     .transfer(AccountId::simple(2), -100)
//!     .transfer(AccountId::simple(5), 100)
//!     .sign(operator_key)? // as payer
//!     .sign(operator_key)? // as sender
//!     .execute()
//!     .await?;
//! assert!(response.precheck.is_ok());
//! # Ok(())
//! # }
//! ```
//!
//! Submission consumes the builder. To retry the same logical transaction,
//! build it again with [`Transaction::transaction_id`] set to the id of the
//! first attempt; the network then treats the retry as a duplicate rather
//! than a second transfer.

pub mod body;
pub mod create_account;
pub mod delete_account;
pub mod transfer;
pub mod update_account;

pub use body::{
    AccountAmount, CryptoCreateAccountBody, CryptoDeleteAccountBody, CryptoTransferBody, CryptoUpdateAccountBody,
    SignedTransaction, TransactionBody, TransactionData,
};
pub use create_account::CryptoCreateAccount;
pub use delete_account::CryptoDeleteAccount;
pub use transfer::CryptoTransfer;
pub use update_account::CryptoUpdateAccount;

use std::time::Duration;

use crate::config;
use crate::crypto::{Signature, Signer};
use crate::error::{Error, Result};
use crate::id::{AccountId, TransactionId};
use crate::network::{Connection, Request, Response};
use crate::query::{GetTransactionReceipt, GetTransactionRecord, Query};
use crate::receipt::ReceiptResolver;
use crate::status::Status;

/// The kind-specific half of a transaction.
pub trait TransactionKind {
    /// Local checks run by [`Transaction::execute`] before anything is
    /// serialized or sent.
    fn validate(&self) -> Result<()>;

    /// The payload as it goes into the body.
    fn to_data(&self) -> Result<TransactionData>;
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// A transaction under construction.
#[must_use = "a transaction does nothing until executed"]
pub struct Transaction<'a, K> {
    connection: &'a Connection,
    transaction_id: Option<TransactionId>,
    operator: Option<AccountId>,
    node: Option<AccountId>,
    memo: String,
    transaction_fee: u64,
    valid_duration: Duration,
    generate_record: bool,
    kind: K,
    signatures: Vec<Signature>,
    /// Body bytes the current signatures cover.
    signed_body: Option<Vec<u8>>,
}

impl<'a, K: TransactionKind> Transaction<'a, K> {
    pub fn new(connection: &'a Connection, kind: K) -> Self {
        Self {
            connection,
            transaction_id: None,
            operator: None,
            node: None,
            memo: String::new(),
            transaction_fee: config::DEFAULT_TRANSACTION_FEE,
            valid_duration: config::DEFAULT_TRANSACTION_VALID_DURATION,
            generate_record: false,
            kind,
            signatures: Vec::new(),
            signed_body: None,
        }
    }

    /// The paying account. Also the account a minted transaction id is
    /// issued under.
    pub fn operator(mut self, id: AccountId) -> Self {
        self.operator = Some(id);
        self
    }

    /// The node that will receive the transaction.
    pub fn node(mut self, id: AccountId) -> Self {
        self.node = Some(id);
        self
    }

    pub fn memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }

    pub fn transaction_fee(mut self, fee: u64) -> Self {
        self.transaction_fee = fee;
        self
    }

    pub fn valid_duration(mut self, duration: Duration) -> Self {
        self.valid_duration = duration;
        self
    }

    /// Keep a record of this transaction in the payer's account history,
    /// where [`Connection::get_account_records`] finds it. Every
    /// transaction's own record stays available through
    /// [`Connection::get_transaction_record`] either way.
    pub fn generate_record(mut self, generate: bool) -> Self {
        self.generate_record = generate;
        self
    }

    /// Use a specific transaction id instead of minting one. This is how a
    /// caller deliberately resubmits the same logical transaction.
    pub fn transaction_id(mut self, id: TransactionId) -> Self {
        self.transaction_id = Some(id);
        self
    }

    /// The id, once set or minted.
    pub fn id(&self) -> Option<TransactionId> {
        self.transaction_id
    }

    /// Signatures in the order they were attached.
    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    pub(crate) fn kind_mut(&mut self) -> &mut K {
        &mut self.kind
    }

    /// Signs the current body and appends the signature.
    ///
    /// Mints the transaction id on first use so that the signed body
    /// carries it. Every call appends, including repeat calls with the
    /// same key. Fails with [`Error::StaleSignature`] if the body changed
    /// since the previous signature.
    pub fn sign(mut self, signer: &dyn Signer) -> Result<Self> {
        self.ensure_id()?;
        let bytes = self.body()?.to_bytes()?;
        self.check_signed_body(&bytes)?;
        self.signatures.push(signer.sign(&bytes));
        self.signed_body = Some(bytes);
        Ok(self)
    }

    /// Assembles the body as it would be submitted now.
    pub fn body(&self) -> Result<TransactionBody> {
        let transaction_id = match (self.transaction_id, self.operator) {
            (Some(id), _) => id,
            (None, Some(_)) => return Err(Error::MissingField("transaction_id")),
            (None, None) => return Err(Error::MissingField("operator")),
        };
        Ok(TransactionBody {
            transaction_id,
            node_account_id: self.node.ok_or(Error::MissingField("node"))?,
            transaction_fee: self.transaction_fee,
            valid_duration_seconds: self.valid_duration.as_secs() as i64,
            generate_record: self.generate_record,
            memo: self.memo.clone(),
            data: self.kind.to_data()?,
        })
    }

    /// Validates, serializes, and submits to the designated node.
    ///
    /// Returns the id and the node's precheck. A non-OK precheck is a
    /// normal outcome, not an error. Local validation failures return
    /// before anything is sent.
    pub async fn execute(mut self) -> Result<TransactionResponse> {
        self.kind.validate()?;
        self.ensure_id()?;
        let body = self.body()?;
        let body_bytes = body.to_bytes()?;
        self.check_signed_body(&body_bytes)?;

        let id = body.transaction_id;
        let kind = body.data.name();
        let signed = SignedTransaction {
            body_bytes,
            signatures: self.signatures,
        };

        tracing::debug!(
            transaction_id = %id,
            kind,
            node = %body.node_account_id,
            signatures = signed.signatures.len(),
            "submitting transaction"
        );

        let precheck = match self.connection.call(Request::Transaction(signed)).await? {
            Response::Transaction { precheck } => precheck,
            Response::Query(_) => {
                return Err(Error::UnexpectedResponse {
                    expected: "transaction precheck",
                })
            }
        };

        if precheck.is_ok() {
            tracing::info!(transaction_id = %id, kind, "transaction accepted");
        } else {
            tracing::info!(transaction_id = %id, kind, %precheck, "transaction rejected at precheck");
        }
        Ok(TransactionResponse { id, precheck })
    }

    fn ensure_id(&mut self) -> Result<()> {
        if self.transaction_id.is_none() {
            let operator = self.operator.ok_or(Error::MissingField("operator"))?;
            self.transaction_id = Some(TransactionId::generate(operator));
        }
        Ok(())
    }

    fn check_signed_body(&self, bytes: &[u8]) -> Result<()> {
        match &self.signed_body {
            Some(signed) if signed.as_slice() != bytes => Err(Error::StaleSignature),
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// What a node said about a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionResponse {
    pub id: TransactionId,
    /// Node-level judgment. `Ok` means accepted for consensus, not final.
    pub precheck: Status,
}

impl TransactionResponse {
    /// A receipt query for this transaction.
    pub fn receipt<'a>(&self, connection: &'a Connection) -> Query<'a, GetTransactionReceipt> {
        connection.get_transaction_receipt(self.id)
    }

    /// A record query for this transaction.
    pub fn record<'a>(&self, connection: &'a Connection) -> Query<'a, GetTransactionRecord> {
        connection.get_transaction_record(self.id)
    }

    /// A resolver that polls for this transaction's receipt with the
    /// default backoff.
    pub fn resolver<'a>(&self, connection: &'a Connection) -> ReceiptResolver<'a> {
        ReceiptResolver::new(connection, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::SecretKey;
    use crate::network::Emulator;

    fn fixture() -> (Emulator, Connection, SecretKey) {
        let key = SecretKey::generate();
        let emulator = Emulator::default();
        emulator.create_account(AccountId::simple(2), key.public(), 1_000_000);
        let connection = Connection::with_channel(emulator.clone());
        (emulator, connection, key)
    }

    #[test]
    fn test_signature_order_is_preserved() {
        let (_, connection, _) = fixture();
        let k1 = SecretKey::generate();
        let k2 = SecretKey::generate();

        let tx = connection
            .create_account()
            .operator(AccountId::simple(2))
            .node(AccountId::simple(3))
            .key(k1.public())
            .sign(&k1)
            .unwrap()
            .sign(&k2)
            .unwrap();

        let bytes = tx.body().unwrap().to_bytes().unwrap();
        assert_eq!(tx.signatures(), &[k1.sign(&bytes), k2.sign(&bytes)]);
    }

    #[test]
    fn test_same_key_twice_appends_twice() {
        let (_, connection, key) = fixture();
        let tx = connection
            .crypto_transfer()
            .operator(AccountId::simple(2))
            .node(AccountId::simple(3))
            .transfer(AccountId::simple(2), -1)
            .transfer(AccountId::simple(5), 1)
            .sign(&key)
            .unwrap()
            .sign(&key)
            .unwrap();
        assert_eq!(tx.signatures().len(), 2);
        assert_eq!(tx.signatures()[0], tx.signatures()[1]);
    }

    #[test]
    fn test_first_sign_mints_id() {
        let (_, connection, key) = fixture();
        let tx = connection
            .create_account()
            .operator(AccountId::simple(2))
            .node(AccountId::simple(3))
            .key(key.public());
        assert!(tx.id().is_none());
        let tx = tx.sign(&key).unwrap();
        let id = tx.id().unwrap();
        assert_eq!(id.account_id, AccountId::simple(2));
        assert_eq!(tx.body().unwrap().transaction_id, id);
    }

    #[test]
    fn test_mutation_after_signing_is_stale() {
        let (_, connection, key) = fixture();
        let err = connection
            .create_account()
            .operator(AccountId::simple(2))
            .node(AccountId::simple(3))
            .key(key.public())
            .sign(&key)
            .unwrap()
            .memo("changed")
            .sign(&key)
            .err()
            .unwrap();
        assert!(matches!(err, Error::StaleSignature));
    }

    #[test]
    fn test_missing_fields() {
        let (_, connection, key) = fixture();
        let err = connection.create_account().node(AccountId::simple(3)).sign(&key).err().unwrap();
        assert!(matches!(err, Error::MissingField("operator")));

        let err = connection.create_account().operator(AccountId::simple(2)).sign(&key).err().unwrap();
        assert!(matches!(err, Error::MissingField("node")));

        let err = connection
            .create_account()
            .operator(AccountId::simple(2))
            .node(AccountId::simple(3))
            .sign(&key)
            .err()
            .unwrap();
        assert!(matches!(err, Error::MissingField("key")));
    }

    #[tokio::test]
    async fn test_execute_mints_id_when_unsigned() {
        let (emulator, connection, key) = fixture();
        let response = connection
            .create_account()
            .operator(AccountId::simple(2))
            .node(AccountId::simple(3))
            .key(key.public())
            .execute()
            .await
            .unwrap();
        assert_eq!(response.id.account_id, AccountId::simple(2));
        // Reached the node, which rejects the missing payer signature.
        assert_eq!(response.precheck, Status::InvalidSignature);
        assert_eq!(emulator.request_count(), 1);
    }

    #[tokio::test]
    async fn test_explicit_id_is_reused() {
        let (_, connection, key) = fixture();
        let id = TransactionId::generate(AccountId::simple(2));
        let build = || {
            connection
                .create_account()
                .transaction_id(id)
                .node(AccountId::simple(3))
                .key(key.public())
                .sign(&key)
                .unwrap()
        };

        let first = build().execute().await.unwrap();
        assert_eq!(first.id, id);
        assert_eq!(first.precheck, Status::Ok);

        let retry = build().execute().await.unwrap();
        assert_eq!(retry.id, id);
        assert_eq!(retry.precheck, Status::DuplicateTransaction);
    }

    #[tokio::test]
    async fn test_non_ok_precheck_is_a_value() {
        let (_, connection, key) = fixture();
        let response = connection
            .create_account()
            .operator(AccountId::simple(2))
            .node(AccountId::simple(99))
            .key(key.public())
            .sign(&key)
            .unwrap()
            .execute()
            .await
            .unwrap();
        assert_eq!(response.precheck, Status::InvalidNodeAccount);
    }
}
