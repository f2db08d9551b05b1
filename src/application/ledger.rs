use crate::config::LedgerConfig;
use crate::domain::account::{Account, AccountId, AccountView, Amount, Balance};
use crate::domain::fee::FeePolicy;
use crate::domain::ports::{AccountSet, AccountStoreRef, UpdateOutcome};
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Applies single-account balance mutations against an `AccountStore`.
///
/// The ledger holds no account state of its own: every operation is one
/// read-compute-write cycle through `AccountStore::atomic_update`, retried a bounded
/// number of times when the store reports a conflict. All checks run inside the update
/// function, before anything is written, so a failed operation never leaves a trace.
#[derive(Clone)]
pub struct Ledger {
    store: AccountStoreRef,
    fees: FeePolicy,
    max_retries: u32,
    max_debt: Option<Decimal>,
}

impl Ledger {
    pub fn new(store: AccountStoreRef, config: &LedgerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            fees: config.fee_policy()?,
            max_retries: config.max_retries,
            max_debt: config.max_debt,
        })
    }

    pub fn store(&self) -> &AccountStoreRef {
        &self.store
    }

    pub fn fees(&self) -> FeePolicy {
        self.fees
    }

    /// Credits `amount` minus the fee to the account and the fee to BANK.
    pub async fn deposit(&self, id: &AccountId, amount: Amount) -> Result<Balance> {
        let (net, fee) = self.fees.split(amount)?;
        let bank = AccountId::bank();
        let ids = BTreeSet::from([id.clone(), bank.clone()]);

        let committed = self
            .commit(ids, |accounts| {
                require(accounts, id, LedgerError::UnknownAccount)?;
                require(accounts, &bank, LedgerError::UnknownAccount)?;
                account_mut(accounts, id)?.credit(net)?;
                account_mut(accounts, &bank)?.credit(fee)
            })
            .await?;

        let balance = balance_of(&committed, id)?;
        debug!(account = %id, %amount, %fee, %balance, "Deposit committed");
        Ok(balance)
    }

    pub async fn withdraw(&self, id: &AccountId, amount: Amount) -> Result<Balance> {
        let committed = self
            .commit(BTreeSet::from([id.clone()]), |accounts| {
                account_mut(accounts, id)?.withdraw(amount)
            })
            .await?;

        let balance = balance_of(&committed, id)?;
        debug!(account = %id, %amount, %balance, "Withdrawal committed");
        Ok(balance)
    }

    pub async fn take_loan(&self, id: &AccountId, amount: Amount) -> Result<Balance> {
        let limit = self.max_debt;
        let committed = self
            .commit(BTreeSet::from([id.clone()]), |accounts| {
                account_mut(accounts, id)?.borrow(amount, limit)
            })
            .await?;

        let balance = balance_of(&committed, id)?;
        debug!(account = %id, %amount, %balance, "Loan issued");
        Ok(balance)
    }

    /// Pays down the account's debt. Over-payment is truncated to the outstanding debt.
    pub async fn repay_loan(&self, id: &AccountId, amount: Amount) -> Result<Balance> {
        let committed = self
            .commit(BTreeSet::from([id.clone()]), |accounts| {
                account_mut(accounts, id)?.repay(amount).map(|_| ())
            })
            .await?;

        let account = committed
            .get(id)
            .ok_or_else(|| LedgerError::UnknownAccount(id.clone()))?;
        debug!(account = %id, %amount, balance = %account.balance, debt = %account.debt, "Loan repayment committed");
        Ok(account.balance)
    }

    pub async fn read_balance(&self, id: &AccountId) -> Result<AccountView> {
        self.store
            .get(id)
            .await?
            .map(|account| account.view())
            .ok_or_else(|| LedgerError::UnknownAccount(id.clone()))
    }

    /// Runs `update` over `ids` as one atomic unit, retrying on store conflicts.
    pub(crate) async fn commit<F>(&self, ids: BTreeSet<AccountId>, update: F) -> Result<AccountSet>
    where
        F: Fn(&mut AccountSet) -> Result<()> + Send + Sync,
    {
        for attempt in 1..=self.max_retries {
            match self.store.atomic_update(&ids, &update).await? {
                UpdateOutcome::Committed(accounts) => return Ok(accounts),
                UpdateOutcome::Conflict => {
                    warn!(attempt, accounts = ?ids, "Store conflict, retrying update");
                    tokio::task::yield_now().await;
                }
            }
        }
        Err(LedgerError::StoreUnavailable(format!(
            "update of {ids:?} still conflicting after {} attempts",
            self.max_retries
        )))
    }
}

/// Fails with `missing(id)` unless the account is part of the update.
pub(crate) fn require(
    accounts: &AccountSet,
    id: &AccountId,
    missing: fn(AccountId) -> LedgerError,
) -> Result<()> {
    if accounts.contains_key(id) {
        Ok(())
    } else {
        Err(missing(id.clone()))
    }
}

pub(crate) fn account_mut<'a>(accounts: &'a mut AccountSet, id: &AccountId) -> Result<&'a mut Account> {
    accounts
        .get_mut(id)
        .ok_or_else(|| LedgerError::UnknownAccount(id.clone()))
}

pub(crate) fn balance_of(accounts: &AccountSet, id: &AccountId) -> Result<Balance> {
    accounts
        .get(id)
        .map(|account| account.balance)
        .ok_or_else(|| LedgerError::UnknownAccount(id.clone()))
}
