use async_trait::async_trait;
use bank_ledger::application::service::{AccountService, DepositRequest, WithdrawRequest};
use bank_ledger::config::LedgerConfig;
use bank_ledger::domain::account::{Account, AccountId, Balance};
use bank_ledger::domain::ports::{AccountStore, AccountStoreRef, UpdateFn, UpdateOutcome};
use bank_ledger::error::{LedgerError, Result};
use bank_ledger::infrastructure::in_memory::InMemoryAccountStore;
use rust_decimal_macros::dec;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// Reports `Conflict` for the first `conflicts` updates, then delegates.
struct ConflictingStore {
    inner: InMemoryAccountStore,
    conflicts: AtomicU32,
    attempts: AtomicU32,
}

impl ConflictingStore {
    fn new(conflicts: u32) -> Self {
        Self {
            inner: InMemoryAccountStore::new(),
            conflicts: AtomicU32::new(conflicts),
            attempts: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl AccountStore for ConflictingStore {
    async fn get(&self, id: &AccountId) -> Result<Option<Account>> {
        self.inner.get(id).await
    }

    async fn create(&self, account: Account) -> Result<()> {
        self.inner.create(account).await
    }

    async fn all_accounts(&self) -> Result<Vec<Account>> {
        self.inner.all_accounts().await
    }

    async fn atomic_update(
        &self,
        ids: &BTreeSet<AccountId>,
        update: UpdateFn<'_>,
    ) -> Result<UpdateOutcome> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let remaining = self.conflicts.load(Ordering::SeqCst);
        if remaining > 0 {
            self.conflicts.store(remaining - 1, Ordering::SeqCst);
            return Ok(UpdateOutcome::Conflict);
        }
        self.inner.atomic_update(ids, update).await
    }
}

async fn service_over(store: Arc<ConflictingStore>, max_retries: u32) -> AccountService {
    let config = LedgerConfig {
        max_retries,
        ..LedgerConfig::default()
    };
    let store: AccountStoreRef = store;
    let service = AccountService::new(store, &config).unwrap();
    service.bootstrap().await.unwrap();
    service.open_account("alice").await.unwrap();
    service
}

#[tokio::test]
async fn test_transient_conflicts_are_retried() {
    let store = Arc::new(ConflictingStore::new(3));
    let service = service_over(store.clone(), 5).await;

    let balance = service
        .deposit(DepositRequest {
            account: "alice".into(),
            amount: dec!(10),
        })
        .await
        .unwrap();

    assert_eq!(balance, Balance::new(dec!(9)));
    assert_eq!(store.attempts.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_persistent_conflicts_surface_as_unavailable() {
    let store = Arc::new(ConflictingStore::new(u32::MAX));
    let service = service_over(store.clone(), 5).await;

    let result = service
        .deposit(DepositRequest {
            account: "alice".into(),
            amount: dec!(10),
        })
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, LedgerError::StoreUnavailable(_)));
    assert!(err.is_transient());
    assert_eq!(store.attempts.load(Ordering::SeqCst), 5);

    let alice = store.get(&AccountId::from("alice")).await.unwrap().unwrap();
    assert_eq!(alice.balance, Balance::ZERO);
}

#[tokio::test]
async fn test_domain_errors_are_not_retried() {
    let store = Arc::new(ConflictingStore::new(0));
    let service = service_over(store.clone(), 5).await;

    let result = service
        .withdraw(WithdrawRequest {
            account: "alice".into(),
            amount: dec!(10),
        })
        .await;

    assert!(matches!(result, Err(LedgerError::InsufficientFunds { .. })));
    assert_eq!(store.attempts.load(Ordering::SeqCst), 1);
}
