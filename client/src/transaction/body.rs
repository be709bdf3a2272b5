//! Wire form of a transaction.
//!
//! A [`TransactionBody`] is serialized with `bincode` into the exact byte
//! string that every signer signs. The node receives those bytes untouched
//! inside a [`SignedTransaction`], so signature checks never depend on a
//! re-encoding matching the client's.

use serde::{Deserialize, Serialize};

use crate::crypto::{sha384, PublicKey, Signature};
use crate::error::Result;
use crate::id::{AccountId, TransactionId};

// ---------------------------------------------------------------------------
// Body
// ---------------------------------------------------------------------------

/// The signed content of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionBody {
    pub transaction_id: TransactionId,
    /// The node the transaction is submitted to.
    pub node_account_id: AccountId,
    /// Maximum fee the payer authorizes.
    pub transaction_fee: u64,
    /// Seconds after the valid start during which the node will accept it.
    pub valid_duration_seconds: i64,
    /// List the record in the payer's account history.
    pub generate_record: bool,
    pub memo: String,
    pub data: TransactionData,
}

/// Kind-specific payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionData {
    CryptoCreateAccount(CryptoCreateAccountBody),
    CryptoTransfer(CryptoTransferBody),
    CryptoUpdateAccount(CryptoUpdateAccountBody),
    CryptoDeleteAccount(CryptoDeleteAccountBody),
}

impl TransactionData {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            TransactionData::CryptoCreateAccount(_) => "crypto_create_account",
            TransactionData::CryptoTransfer(_) => "crypto_transfer",
            TransactionData::CryptoUpdateAccount(_) => "crypto_update_account",
            TransactionData::CryptoDeleteAccount(_) => "crypto_delete_account",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CryptoCreateAccountBody {
    /// Key that will control the new account.
    pub key: PublicKey,
    pub initial_balance: u64,
    pub auto_renew_period_seconds: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CryptoTransferBody {
    /// Entries in the order they were added. Negative amounts debit.
    pub transfers: Vec<AccountAmount>,
}

/// Changes to an existing account. `None` leaves a property as it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CryptoUpdateAccountBody {
    pub account_id: AccountId,
    /// Replacement key. The new key must sign as well as the old one.
    pub key: Option<PublicKey>,
    pub auto_renew_period_seconds: Option<i64>,
}

/// Deletes an account, sweeping its balance into another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CryptoDeleteAccountBody {
    pub delete_account_id: AccountId,
    /// Receives the deleted account's remaining balance.
    pub transfer_account_id: AccountId,
}

/// One leg of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountAmount {
    pub account_id: AccountId,
    pub amount: i64,
}

impl TransactionBody {
    /// Canonical encoding; the bytes signers sign.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}

// ---------------------------------------------------------------------------
// Signed envelope
// ---------------------------------------------------------------------------

/// Body bytes plus signatures in the order they were attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    #[serde(with = "hex")]
    pub body_bytes: Vec<u8>,
    pub signatures: Vec<Signature>,
}

impl SignedTransaction {
    /// Decodes the body.
    pub fn body(&self) -> Result<TransactionBody> {
        TransactionBody::from_bytes(&self.body_bytes)
    }

    /// SHA-384 over the encoded envelope.
    pub fn hash(&self) -> Result<[u8; 48]> {
        Ok(sha384(&bincode::serialize(self)?))
    }
}
