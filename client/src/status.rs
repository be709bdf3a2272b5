//! Response codes shared by prechecks and receipts.
//!
//! A node answers every submission and query with a precheck [`Status`];
//! `Ok` means the node accepted the request for processing. A receipt
//! carries a second `Status` describing the consensus outcome: `Unknown`
//! while the network is still working on it, `Success`, or one of the
//! failure codes.
//!
//! Codes travel as plain integers. A code this build does not know about
//! decodes to [`Status::Unrecognized`] instead of failing, so a newer node
//! never breaks an older client.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! statuses {
    ($($(#[$doc:meta])* $name:ident = $code:literal,)+) => {
        /// A precheck or receipt response code.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "i32", into = "i32")]
        pub enum Status {
            $($(#[$doc])* $name,)+
            /// A code not known to this client.
            Unrecognized(i32),
        }

        impl Status {
            /// Every known status, in code order.
            pub const ALL: &'static [Status] = &[$(Status::$name,)+];

            /// The numeric wire code.
            pub fn code(self) -> i32 {
                match self {
                    $(Status::$name => $code,)+
                    Status::Unrecognized(code) => code,
                }
            }

            /// Decodes a numeric wire code.
            pub fn from_code(code: i32) -> Self {
                match code {
                    $($code => Status::$name,)+
                    other => Status::Unrecognized(other),
                }
            }
        }
    };
}

statuses! {
    /// The request passed node-level checks.
    Ok = 0,
    InvalidTransaction = 1,
    PayerAccountNotFound = 2,
    /// The body names a node account the receiving node does not serve.
    InvalidNodeAccount = 3,
    TransactionExpired = 4,
    InvalidTransactionStart = 5,
    InvalidTransactionDuration = 6,
    InvalidSignature = 7,
    MemoTooLong = 8,
    InsufficientTxFee = 9,
    InsufficientPayerBalance = 10,
    /// A transaction with the same id was already received.
    DuplicateTransaction = 11,
    /// The node is overloaded; try again later.
    Busy = 12,
    NotSupported = 13,
    InvalidFileId = 14,
    InvalidAccountId = 15,
    InvalidContractId = 16,
    InvalidTransactionId = 17,
    /// The node has no receipt for the transaction id (yet).
    ReceiptNotFound = 18,
    RecordNotFound = 19,
    InvalidSolidityId = 20,
    /// The transaction has not reached consensus yet.
    Unknown = 21,
    /// The transaction reached consensus and was applied.
    Success = 22,
    FailInvalid = 23,
    FailFee = 24,
    FailBalance = 25,
    KeyRequired = 26,
    BadEncoding = 27,
    InsufficientAccountBalance = 28,
    InvalidSolidityAddress = 29,
    InsufficientGas = 30,
    ContractSizeLimitExceeded = 31,
    LocalCallModificationException = 32,
    ContractRevertExecuted = 33,
    ContractExecutionException = 34,
    InvalidReceivingNodeAccount = 35,
    MissingQueryHeader = 36,
    AccountUpdateFailed = 37,
    InvalidKeyEncoding = 38,
    NullSolidityAddress = 39,
    ContractUpdateFailed = 40,
    InvalidQueryHeader = 41,
    InvalidFeeSubmitted = 42,
    InvalidPayerSignature = 43,
    KeyNotProvided = 44,
    InvalidExpirationTime = 45,
    NoWaclKey = 46,
    FileContentEmpty = 47,
    /// Transfer amounts do not net to zero.
    InvalidAccountAmounts = 48,
    EmptyTransactionBody = 49,
    InvalidTransactionBody = 50,
    /// The account was deleted and can no longer pay, send or receive.
    AccountDeleted = 51,
    /// A delete names the account being deleted as the beneficiary.
    TransferAccountSameAsDeleteAccount = 52,
    AutoRenewDurationNotInRange = 53,
}

impl Status {
    /// Node-level acceptance.
    pub fn is_ok(self) -> bool {
        self == Status::Ok
    }

    /// Consensus-level success.
    pub fn is_success(self) -> bool {
        self == Status::Success
    }

    /// The receipt is not final yet.
    pub fn is_pending(self) -> bool {
        self == Status::Unknown
    }

    /// A precheck that says "ask again later" rather than "no".
    pub fn is_transient(self) -> bool {
        matches!(self, Status::Busy | Status::ReceiptNotFound | Status::RecordNotFound)
    }
}

impl From<i32> for Status {
    fn from(code: i32) -> Self {
        Status::from_code(code)
    }
}

impl From<Status> for i32 {
    fn from(status: Status) -> Self {
        status.code()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Unrecognized(code) => write!(f, "unrecognized status {code}"),
            known => write!(f, "{known:?} ({})", known.code()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_dense_and_round_trip() {
        for (expected, status) in Status::ALL.iter().enumerate() {
            assert_eq!(status.code(), expected as i32);
            assert_eq!(Status::from_code(status.code()), *status);
        }
        assert_eq!(Status::ALL.len(), 54);
    }

    #[test]
    fn test_well_known_codes() {
        assert_eq!(Status::Ok.code(), 0);
        assert_eq!(Status::InvalidSignature.code(), 7);
        assert_eq!(Status::DuplicateTransaction.code(), 11);
        assert_eq!(Status::Unknown.code(), 21);
        assert_eq!(Status::Success.code(), 22);
        assert_eq!(Status::InsufficientAccountBalance.code(), 28);
        assert_eq!(Status::AccountDeleted.code(), 51);
    }

    #[test]
    fn test_unrecognized_code_is_preserved() {
        let status = Status::from_code(4_242);
        assert_eq!(status, Status::Unrecognized(4_242));
        assert_eq!(status.code(), 4_242);
        assert!(!status.is_ok());
        assert!(!status.is_pending());
    }

    #[test]
    fn test_classification() {
        assert!(Status::Ok.is_ok());
        assert!(!Status::Success.is_ok());
        assert!(Status::Success.is_success());
        assert!(Status::Unknown.is_pending());
        assert!(Status::Busy.is_transient());
        assert!(Status::ReceiptNotFound.is_transient());
        assert!(Status::RecordNotFound.is_transient());
        assert!(!Status::InvalidSignature.is_transient());
    }

    #[test]
    fn test_serde_as_integer() {
        assert_eq!(serde_json::to_string(&Status::Success).unwrap(), "22");
        assert_eq!(serde_json::from_str::<Status>("7").unwrap(), Status::InvalidSignature);
        assert_eq!(serde_json::from_str::<Status>("999").unwrap(), Status::Unrecognized(999));
    }

    #[test]
    fn test_display() {
        assert_eq!(Status::Success.to_string(), "Success (22)");
        assert_eq!(Status::Unrecognized(77).to_string(), "unrecognized status 77");
    }
}
