use super::ledger::{Ledger, account_mut, balance_of, require};
use crate::domain::account::{AccountId, Amount, Balance};
use crate::error::{LedgerError, Result};
use std::collections::BTreeSet;
use tracing::debug;

/// Sequences two-account transfers into one atomic update and owns the fee skim.
///
/// A transfer touches `{source, target, BANK}`. The key set is a `BTreeSet`, so the
/// store always acquires those keys in id order regardless of transfer direction.
#[derive(Clone)]
pub struct TransactionCoordinator {
    ledger: Ledger,
}

impl TransactionCoordinator {
    pub fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }

    /// Moves `amount` out of `from`, credits `to` with `amount - fee` and BANK with the
    /// fee. Returns the new source balance.
    pub async fn transfer(&self, from: &AccountId, to: &AccountId, amount: Amount) -> Result<Balance> {
        let (net, fee) = self.ledger.fees().split(amount)?;
        let bank = AccountId::bank();
        let ids = BTreeSet::from([from.clone(), to.clone(), bank.clone()]);

        let committed = self
            .ledger
            .commit(ids, |accounts| {
                require(accounts, from, LedgerError::UnknownAccount)?;
                let source = &accounts[from];
                if source.balance < Balance::from(amount) {
                    return Err(LedgerError::InsufficientFunds {
                        account: from.clone(),
                        balance: source.balance.value(),
                        requested: amount.value(),
                    });
                }
                require(accounts, to, LedgerError::UnknownRecipient)?;
                require(accounts, &bank, LedgerError::UnknownAccount)?;

                account_mut(accounts, from)?.withdraw(amount)?;
                account_mut(accounts, to)?.credit(net)?;
                account_mut(accounts, &bank)?.credit(fee)
            })
            .await?;

        let balance = balance_of(&committed, from)?;
        debug!(from = %from, to = %to, %amount, %fee, %balance, "Transfer committed");
        Ok(balance)
    }
}
