//! Account info lookup.

use serde::{Deserialize, Serialize};

use super::QueryKind;
use crate::crypto::PublicKey;
use crate::id::AccountId;
use crate::network::{Answer, QueryBody};
use crate::timestamp::Timestamp;

/// What the network knows about one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub account_id: AccountId,
    /// Key that must sign for the account.
    pub key: PublicKey,
    pub balance: u64,
    /// Deleted accounts stay visible here until they expire.
    pub deleted: bool,
    pub auto_renew_period_seconds: i64,
    pub expiration_time: Timestamp,
}

/// Asks for an account's key, balance and lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetAccountInfo(pub AccountId);

impl QueryKind for GetAccountInfo {
    type Answer = AccountInfo;

    const NAME: &'static str = "account info";

    fn body(&self) -> QueryBody {
        QueryBody::AccountInfo { account_id: self.0 }
    }

    fn decode(answer: Answer) -> Option<AccountInfo> {
        match answer {
            Answer::AccountInfo(info) => Some(info),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::config;
    use crate::crypto::SecretKey;
    use crate::error::Error;
    use crate::id::AccountId;
    use crate::network::{Connection, Emulator};
    use crate::status::Status;
    use crate::timestamp::Timestamp;

    #[tokio::test]
    async fn test_info_reflects_account() {
        let emulator = Emulator::default();
        let key = SecretKey::generate().public();
        emulator.create_account(AccountId::simple(5), key, 1_234);
        let connection = Connection::with_channel(emulator.clone());

        let before = Timestamp::now();
        let info = connection.get_account_info(AccountId::simple(5)).answer().await.unwrap();
        assert_eq!(info.account_id, AccountId::simple(5));
        assert_eq!(info.key, key);
        assert_eq!(info.balance, 1_234);
        assert!(!info.deleted);
        assert_eq!(
            info.auto_renew_period_seconds,
            config::DEFAULT_AUTO_RENEW_PERIOD.as_secs() as i64
        );
        let earliest = before.saturating_add(config::DEFAULT_AUTO_RENEW_PERIOD - Duration::from_secs(5));
        assert!(info.expiration_time > earliest);

        let cost = connection.get_account_info(AccountId::simple(5)).cost().await.unwrap();
        assert_eq!(cost.cost, emulator.config().query_cost);
    }

    #[tokio::test]
    async fn test_unknown_account() {
        let connection = Connection::with_channel(Emulator::default());
        let err = connection.get_account_info(AccountId::simple(404)).answer().await.unwrap_err();
        assert!(matches!(err, Error::PreCheck(Status::InvalidAccountId)));
    }
}
