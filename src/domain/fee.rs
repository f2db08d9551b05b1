use super::account::{Amount, Balance};
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;

/// Flat fee skimmed into the BANK account on deposits and transfers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeePolicy {
    fee: Balance,
}

impl FeePolicy {
    pub fn flat(fee: Decimal) -> Result<Self> {
        if fee < Decimal::ZERO {
            return Err(LedgerError::Config(format!(
                "fee must not be negative, got {fee}"
            )));
        }
        Ok(Self {
            fee: Balance::new(fee),
        })
    }

    pub fn fee(&self) -> Balance {
        self.fee
    }

    /// Splits `amount` into the part credited to the recipient and the fee.
    ///
    /// The two parts always sum to `amount`. Amounts smaller than the fee are rejected.
    pub fn split(&self, amount: Amount) -> Result<(Balance, Balance)> {
        let gross = Balance::from(amount);
        if gross < self.fee {
            return Err(LedgerError::InvalidAmount(format!(
                "amount {amount} does not cover the fee of {}",
                self.fee
            )));
        }
        Ok((gross.checked_sub(self.fee)?, self.fee))
    }
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self {
            fee: Balance::new(Decimal::ONE),
        }
    }
}
