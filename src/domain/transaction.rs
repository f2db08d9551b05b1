use super::account::{AccountId, Amount};
use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Deposit,
    Withdraw,
    Transfer,
    TakeLoan,
    RepayLoan,
}

/// An intended mutation of one or two accounts.
///
/// `target` is only meaningful for transfers.
#[derive(Debug, PartialEq, Clone)]
pub struct Transaction {
    pub kind: TransactionKind,
    pub source: AccountId,
    pub target: Option<AccountId>,
    pub amount: Amount,
}

impl Transaction {
    pub fn new(kind: TransactionKind, source: impl Into<AccountId>, amount: Amount) -> Self {
        Self {
            kind,
            source: source.into(),
            target: None,
            amount,
        }
    }

    pub fn transfer(from: impl Into<AccountId>, to: impl Into<AccountId>, amount: Amount) -> Self {
        Self {
            kind: TransactionKind::Transfer,
            source: from.into(),
            target: Some(to.into()),
            amount,
        }
    }
}
