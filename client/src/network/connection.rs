//! The client's handle on one node.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::message::{Request, Response};
use super::tcp::TcpChannel;
use super::Channel;
use crate::config::ConnectionConfig;
use crate::error::{Error, Result};
use crate::id::{AccountId, TransactionId};
use crate::query::{
    GetAccountBalance, GetAccountInfo, GetAccountRecords, GetTransactionReceipt, GetTransactionRecord, Query,
};
use crate::transaction::{CryptoCreateAccount, CryptoDeleteAccount, CryptoTransfer, CryptoUpdateAccount, Transaction};

/// An open channel to one node.
///
/// Transactions and queries borrow the connection, so they cannot outlive
/// it. After [`close`](Self::close), every request fails with
/// [`Error::ConnectionClosed`]. The connection is `Send + Sync` and may be
/// shared by concurrent requests; the channel serializes its own I/O.
pub struct Connection {
    channel: Arc<dyn Channel>,
    config: ConnectionConfig,
    closed: AtomicBool,
}

impl Connection {
    /// Connects to `address` (`host:port`) over TCP with default settings.
    ///
    /// Fails fast with [`Error::Connection`]; there is no retry here.
    pub async fn open(address: &str) -> Result<Self> {
        Self::open_with_config(address, ConnectionConfig::default()).await
    }

    pub async fn open_with_config(address: &str, config: ConnectionConfig) -> Result<Self> {
        let channel = TcpChannel::connect(address, config.connect_timeout)
            .await
            .map_err(|source| Error::Connection {
                address: address.to_string(),
                source,
            })?;
        tracing::debug!(address, "connection opened");
        Ok(Self::with_channel_and_config(channel, config))
    }

    /// Wraps an already established channel.
    pub fn with_channel<C: Channel + 'static>(channel: C) -> Self {
        Self::with_channel_and_config(channel, ConnectionConfig::default())
    }

    pub fn with_channel_and_config<C: Channel + 'static>(channel: C, config: ConnectionConfig) -> Self {
        Self {
            channel: Arc::new(channel),
            config,
            closed: AtomicBool::new(false),
        }
    }

    pub fn address(&self) -> &str {
        self.channel.address()
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Releases the channel. Calling it again is a no-op.
    pub async fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.channel.close().await;
            tracing::debug!(address = self.address(), "connection closed");
        }
    }

    /// One round trip under the request deadline.
    pub(crate) async fn call(&self, request: Request) -> Result<Response> {
        if self.is_closed() {
            return Err(Error::ConnectionClosed);
        }
        let name = request.name();
        let after = self.config.request_timeout;
        match tokio::time::timeout(after, self.channel.call(request)).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(err)) => {
                tracing::warn!(address = self.address(), request = name, error = %err, "transport failure");
                Err(Error::Submission(err))
            }
            Err(_) => {
                tracing::warn!(address = self.address(), request = name, ?after, "request timed out");
                Err(Error::Timeout { after })
            }
        }
    }

    // -----------------------------------------------------------------------
    // Factories
    // -----------------------------------------------------------------------

    /// Starts an account-creation transaction.
    pub fn create_account(&self) -> Transaction<'_, CryptoCreateAccount> {
        Transaction::new(self, CryptoCreateAccount::default())
    }

    /// Starts a transfer transaction.
    pub fn crypto_transfer(&self) -> Transaction<'_, CryptoTransfer> {
        Transaction::new(self, CryptoTransfer::default())
    }

    /// Starts an update of `account_id`.
    pub fn update_account(&self, account_id: AccountId) -> Transaction<'_, CryptoUpdateAccount> {
        Transaction::new(self, CryptoUpdateAccount::new(account_id))
    }

    /// Starts the deletion of `account_id`.
    pub fn delete_account(&self, account_id: AccountId) -> Transaction<'_, CryptoDeleteAccount> {
        Transaction::new(self, CryptoDeleteAccount::new(account_id))
    }

    pub fn get_account_balance(&self, account_id: AccountId) -> Query<'_, GetAccountBalance> {
        Query::new(self, GetAccountBalance(account_id))
    }

    pub fn get_account_info(&self, account_id: AccountId) -> Query<'_, GetAccountInfo> {
        Query::new(self, GetAccountInfo(account_id))
    }

    pub fn get_account_records(&self, account_id: AccountId) -> Query<'_, GetAccountRecords> {
        Query::new(self, GetAccountRecords(account_id))
    }

    pub fn get_transaction_receipt(&self, transaction_id: TransactionId) -> Query<'_, GetTransactionReceipt> {
        Query::new(self, GetTransactionReceipt(transaction_id))
    }

    pub fn get_transaction_record(&self, transaction_id: TransactionId) -> Query<'_, GetTransactionRecord> {
        Query::new(self, GetTransactionRecord(transaction_id))
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("address", &self.address())
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::network::Emulator;
    use async_trait::async_trait;
    use std::time::Duration;

    /// A node that never answers.
    struct Silent;

    #[async_trait]
    impl Channel for Silent {
        fn address(&self) -> &str {
            "silent"
        }

        async fn call(&self, _request: Request) -> std::result::Result<Response, TransportError> {
            std::future::pending().await
        }

        async fn close(&self) {}
    }

    #[test]
    fn test_connection_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Connection>();
    }

    #[tokio::test]
    async fn test_requests_fail_after_close() {
        let connection = Connection::with_channel(Emulator::default());
        connection.close().await;
        connection.close().await;
        assert!(connection.is_closed());

        let err = connection
            .get_account_balance(AccountId::simple(2))
            .send()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ConnectionClosed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_deadline() {
        let config = ConnectionConfig {
            request_timeout: Duration::from_secs(3),
            ..ConnectionConfig::default()
        };
        let connection = Connection::with_channel_and_config(Silent, config);
        let err = connection
            .get_account_balance(AccountId::simple(2))
            .send()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout { after } if after == Duration::from_secs(3)));
    }

    #[tokio::test]
    async fn test_open_unresolvable_address_fails_fast() {
        let err = Connection::open("definitely-not-a-host.invalid:50211").await.unwrap_err();
        match err {
            Error::Connection { address, .. } => assert_eq!(address, "definitely-not-a-host.invalid:50211"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transport_failure_is_submission_error() {
        let emulator = Emulator::default();
        emulator.set_offline(true);
        let connection = Connection::with_channel(emulator);
        let err = connection
            .get_account_balance(AccountId::simple(2))
            .send()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Submission(TransportError::Unreachable)));
    }
}
