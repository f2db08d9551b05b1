use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of the account that collects the per-operation fee.
pub const BANK_ACCOUNT_ID: &str = "BANK";

/// Unique, immutable account identifier (the username).
///
/// Ordering is the global lock order used for multi-account updates.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The fee-sink account.
    pub fn bank() -> Self {
        Self(BANK_ACCOUNT_ID.to_string())
    }

    pub fn is_bank(&self) -> bool {
        self.0 == BANK_ACCOUNT_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for AccountId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A monetary value held by an account.
///
/// Wraps `rust_decimal::Decimal` so repeated fee skims never accumulate rounding drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Balance(pub Decimal);

/// A strictly positive amount requested by an operation.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(LedgerError::InvalidAmount(format!(
                "amount must be positive, got {value}"
            )))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = LedgerError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl FromStr for Amount {
    type Err = LedgerError;

    fn from_str(raw: &str) -> Result<Self> {
        let value = Decimal::from_str(raw.trim())
            .map_err(|_| LedgerError::InvalidAmount(format!("`{raw}` is not a number")))?;
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl From<Amount> for Balance {
    fn from(amount: Amount) -> Self {
        Self(amount.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Sum of two balances, or `InvalidAmount` if it exceeds the decimal range.
    pub fn checked_add(self, other: Self) -> Result<Self> {
        self.0.checked_add(other.0).map(Self).ok_or_else(|| {
            LedgerError::InvalidAmount(format!("{} + {} overflows", self.0, other.0))
        })
    }

    pub fn checked_sub(self, other: Self) -> Result<Self> {
        self.0.checked_sub(other.0).map(Self).ok_or_else(|| {
            LedgerError::InvalidAmount(format!("{} - {} overflows", self.0, other.0))
        })
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A ledger account as persisted by an `AccountStore`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Account {
    pub id: AccountId,
    /// Funds available to withdraw, transfer or repay with.
    pub balance: Balance,
    /// Outstanding loan principal. Never negative.
    pub debt: Balance,
}

/// Read-only projection of an account.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct AccountView {
    #[serde(rename = "account")]
    pub id: AccountId,
    pub balance: Balance,
    pub debt: Balance,
}

impl Account {
    pub fn new(id: impl Into<AccountId>) -> Self {
        Self {
            id: id.into(),
            balance: Balance::ZERO,
            debt: Balance::ZERO,
        }
    }

    /// Adds funds to the balance. Leaves the account untouched on overflow.
    pub fn credit(&mut self, amount: Balance) -> Result<()> {
        self.balance = self.balance.checked_add(amount)?;
        Ok(())
    }

    /// Removes funds from the balance if it covers the amount.
    pub fn withdraw(&mut self, amount: Amount) -> Result<()> {
        let amount = Balance::from(amount);
        if self.balance < amount {
            return Err(self.insufficient(amount));
        }
        self.balance = self.balance.checked_sub(amount)?;
        Ok(())
    }

    /// Credits a loan and records it as debt, optionally bounded by `limit`.
    pub fn borrow(&mut self, amount: Amount, limit: Option<Decimal>) -> Result<()> {
        let amount = Balance::from(amount);
        let debt = self.debt.checked_add(amount)?;
        if let Some(limit) = limit
            && debt.value() > limit
        {
            return Err(LedgerError::CreditLimitExceeded {
                account: self.id.clone(),
                debt: debt.value(),
                limit,
            });
        }
        self.balance = self.balance.checked_add(amount)?;
        self.debt = debt;
        Ok(())
    }

    /// Pays down the loan, returning what was actually paid.
    ///
    /// The balance must cover the requested amount; the payment itself is capped at the
    /// outstanding debt so debt never goes below zero.
    pub fn repay(&mut self, amount: Amount) -> Result<Balance> {
        if self.debt == Balance::ZERO {
            return Err(LedgerError::InvalidAmount(format!(
                "account `{}` has no outstanding loan",
                self.id
            )));
        }
        let requested = Balance::from(amount);
        if self.balance < requested {
            return Err(self.insufficient(requested));
        }
        let paid = requested.min(self.debt);
        let balance = self.balance.checked_sub(paid)?;
        self.debt = self.debt.checked_sub(paid)?;
        self.balance = balance;
        Ok(paid)
    }

    pub fn view(&self) -> AccountView {
        AccountView {
            id: self.id.clone(),
            balance: self.balance,
            debt: self.debt,
        }
    }

    fn insufficient(&self, requested: Balance) -> LedgerError {
        LedgerError::InsufficientFunds {
            account: self.id.clone(),
            balance: self.balance.value(),
            requested: requested.value(),
        }
    }
}
