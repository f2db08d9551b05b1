use super::coordinator::TransactionCoordinator;
use super::ledger::Ledger;
use crate::config::LedgerConfig;
use crate::domain::account::{Account, AccountId, AccountView, Amount, Balance};
use crate::domain::ports::AccountStoreRef;
use crate::domain::transaction::{Transaction, TransactionKind};
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DepositRequest {
    pub account: AccountId,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WithdrawRequest {
    pub account: AccountId,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransferRequest {
    pub from: AccountId,
    pub to: AccountId,
    pub amount: Decimal,
}

/// Used for both taking and repaying a loan.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoanRequest {
    pub account: AccountId,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BalanceRequest {
    pub account: AccountId,
}

/// The public contract of the ledger.
///
/// Callers are expected to have authenticated the account owner already. The service
/// only validates the shape of each request (a positive amount) and delegates to the
/// `Ledger` or, for transfers, the `TransactionCoordinator`.
#[derive(Clone)]
pub struct AccountService {
    ledger: Ledger,
    coordinator: TransactionCoordinator,
}

impl AccountService {
    pub fn new(store: AccountStoreRef, config: &LedgerConfig) -> Result<Self> {
        let ledger = Ledger::new(store, config)?;
        let coordinator = TransactionCoordinator::new(ledger.clone());
        Ok(Self { ledger, coordinator })
    }

    /// Parses untrusted text into a positive amount.
    pub fn parse_amount(raw: &str) -> Result<Amount> {
        raw.parse()
    }

    /// Creates the BANK fee account unless it already exists.
    pub async fn bootstrap(&self) -> Result<()> {
        match self.ledger.store().create(Account::new(AccountId::bank())).await {
            Ok(()) => {
                info!("Created BANK account");
                Ok(())
            }
            Err(LedgerError::AccountExists(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Registers a new account with zero balance and no debt.
    pub async fn open_account(&self, id: impl Into<AccountId>) -> Result<AccountView> {
        let account = Account::new(id);
        let view = account.view();
        self.ledger.store().create(account).await?;
        info!(account = %view.id, "Opened account");
        Ok(view)
    }

    pub async fn deposit(&self, request: DepositRequest) -> Result<Balance> {
        let amount = Amount::new(request.amount)?;
        self.ledger.deposit(&request.account, amount).await
    }

    pub async fn withdraw(&self, request: WithdrawRequest) -> Result<Balance> {
        let amount = Amount::new(request.amount)?;
        self.ledger.withdraw(&request.account, amount).await
    }

    pub async fn transfer(&self, request: TransferRequest) -> Result<Balance> {
        let amount = Amount::new(request.amount)?;
        self.coordinator
            .transfer(&request.from, &request.to, amount)
            .await
    }

    pub async fn take_loan(&self, request: LoanRequest) -> Result<Balance> {
        let amount = Amount::new(request.amount)?;
        self.ledger.take_loan(&request.account, amount).await
    }

    pub async fn repay_loan(&self, request: LoanRequest) -> Result<Balance> {
        let amount = Amount::new(request.amount)?;
        self.ledger.repay_loan(&request.account, amount).await
    }

    pub async fn balance(&self, request: BalanceRequest) -> Result<AccountView> {
        self.ledger.read_balance(&request.account).await
    }

    /// Dispatches a pre-validated transaction to the matching operation.
    pub async fn execute(&self, tx: Transaction) -> Result<Balance> {
        let Transaction {
            kind,
            source,
            target,
            amount,
        } = tx;
        match kind {
            TransactionKind::Deposit => self.ledger.deposit(&source, amount).await,
            TransactionKind::Withdraw => self.ledger.withdraw(&source, amount).await,
            TransactionKind::TakeLoan => self.ledger.take_loan(&source, amount).await,
            TransactionKind::RepayLoan => self.ledger.repay_loan(&source, amount).await,
            TransactionKind::Transfer => {
                let target = target.ok_or_else(|| LedgerError::MissingRecipient(source.clone()))?;
                self.coordinator.transfer(&source, &target, amount).await
            }
        }
    }

    /// Every account, sorted by id.
    pub async fn accounts(&self) -> Result<Vec<AccountView>> {
        let mut views: Vec<AccountView> = self
            .ledger
            .store()
            .all_accounts()
            .await?
            .iter()
            .map(Account::view)
            .collect();
        views.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(views)
    }
}
