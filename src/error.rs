use crate::domain::account::AccountId;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Unknown account `{0}`")]
    UnknownAccount(AccountId),
    #[error("Unknown recipient `{0}`")]
    UnknownRecipient(AccountId),
    #[error("Transfer from `{0}` names no recipient")]
    MissingRecipient(AccountId),
    #[error("Account `{0}` already exists")]
    AccountExists(AccountId),
    #[error("Insufficient funds in `{account}`: balance {balance}, requested {requested}")]
    InsufficientFunds {
        account: AccountId,
        balance: Decimal,
        requested: Decimal,
    },
    #[error("Credit limit exceeded for `{account}`: debt would be {debt}, limit is {limit}")]
    CreditLimitExceeded {
        account: AccountId,
        debt: Decimal,
        limit: Decimal,
    },
    #[error("Account store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    /// Whether the failure is a storage-level one the caller may retry as a whole.
    ///
    /// Domain errors (amounts, unknown accounts, funds) are final: retrying the same
    /// request against the same state produces the same error.
    pub fn is_transient(&self) -> bool {
        matches!(self, LedgerError::StoreUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
