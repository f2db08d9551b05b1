use crate::domain::account::{Account, AccountId};
use crate::domain::ports::{AccountSet, AccountStore, UpdateFn, UpdateOutcome};
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

type AccountSlot = Arc<Mutex<Account>>;

/// A thread-safe in-memory account store.
///
/// Each account sits behind its own `Mutex`, so updates over disjoint accounts run in
/// parallel. The outer `RwLock` only guards the id → slot map and is never held while
/// an update runs. Multi-account updates lock their slots in id order, which makes
/// them deadlock-free and means a commit never reports `Conflict`.
#[derive(Default, Clone)]
pub struct InMemoryAccountStore {
    accounts: Arc<RwLock<HashMap<AccountId, AccountSlot>>>,
}

impl InMemoryAccountStore {
    /// Creates a new, empty in-memory account store.
    pub fn new() -> Self {
        Self::default()
    }

    async fn slot(&self, id: &AccountId) -> Option<AccountSlot> {
        self.accounts.read().await.get(id).cloned()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn get(&self, id: &AccountId) -> Result<Option<Account>> {
        match self.slot(id).await {
            Some(slot) => Ok(Some(slot.lock().await.clone())),
            None => Ok(None),
        }
    }

    async fn create(&self, account: Account) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&account.id) {
            return Err(LedgerError::AccountExists(account.id));
        }
        accounts.insert(account.id.clone(), Arc::new(Mutex::new(account)));
        Ok(())
    }

    async fn all_accounts(&self) -> Result<Vec<Account>> {
        let slots: Vec<AccountSlot> = self.accounts.read().await.values().cloned().collect();

        let mut accounts = Vec::with_capacity(slots.len());
        for slot in slots {
            accounts.push(slot.lock().await.clone());
        }
        accounts.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(accounts)
    }

    async fn atomic_update(
        &self,
        ids: &BTreeSet<AccountId>,
        update: UpdateFn<'_>,
    ) -> Result<UpdateOutcome> {
        let slots: Vec<AccountSlot> = {
            let accounts = self.accounts.read().await;
            ids.iter().filter_map(|id| accounts.get(id).cloned()).collect()
        };

        // `ids` iterates in sorted order: every caller locks in the same sequence.
        let mut guards = Vec::with_capacity(slots.len());
        for slot in slots {
            guards.push(slot.lock_owned().await);
        }

        let mut working: AccountSet = guards
            .iter()
            .map(|guard| (guard.id.clone(), (**guard).clone()))
            .collect();
        update(&mut working)?;

        let mut committed = AccountSet::new();
        for guard in guards.iter_mut() {
            if let Some(account) = working.remove(&guard.id) {
                **guard = account;
            }
            committed.insert(guard.id.clone(), (**guard).clone());
        }
        Ok(UpdateOutcome::Committed(committed))
    }
}
