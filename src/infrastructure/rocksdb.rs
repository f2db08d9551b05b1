use crate::domain::account::{Account, AccountId};
use crate::domain::ports::{AccountSet, AccountStore, UpdateFn, UpdateOutcome};
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, ErrorKind, OptimisticTransactionDB, Options};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing account records.
pub const CF_ACCOUNTS: &str = "accounts";

impl From<rocksdb::Error> for LedgerError {
    fn from(e: rocksdb::Error) -> Self {
        LedgerError::StoreUnavailable(format!("RocksDB error: {e}"))
    }
}

/// A persistent account store backed by a RocksDB optimistic transaction database.
///
/// `atomic_update` reads its keys with `get_for_update` and commits them in one
/// transaction. If another writer committed to any of those keys in the meantime the
/// commit fails with `Busy`, which is surfaced as `UpdateOutcome::Conflict`.
///
/// `Clone` shares the underlying `Arc<OptimisticTransactionDB>`.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<OptimisticTransactionDB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_accounts = ColumnFamilyDescriptor::new(CF_ACCOUNTS, Options::default());
        let db = OptimisticTransactionDB::open_cf_descriptors(&opts, path, vec![cf_accounts])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn accounts_cf(&self) -> Result<&ColumnFamily> {
        self.db.cf_handle(CF_ACCOUNTS).ok_or_else(|| {
            LedgerError::StoreUnavailable("Accounts column family not found".to_string())
        })
    }

    fn update_sync(&self, ids: &BTreeSet<AccountId>, update: UpdateFn<'_>) -> Result<UpdateOutcome> {
        let cf = self.accounts_cf()?;
        let txn = self.db.transaction();

        let mut working = AccountSet::new();
        for id in ids {
            if let Some(bytes) = txn.get_for_update_cf(cf, id.as_str(), true)? {
                working.insert(id.clone(), decode(&bytes)?);
            }
        }
        let present: BTreeSet<AccountId> = working.keys().cloned().collect();

        update(&mut working)?;
        working.retain(|id, _| present.contains(id));

        for account in working.values() {
            txn.put_cf(cf, account.id.as_str(), encode(account)?)?;
        }

        match txn.commit() {
            Ok(()) => Ok(UpdateOutcome::Committed(working)),
            Err(e) if matches!(e.kind(), ErrorKind::Busy | ErrorKind::TryAgain) => {
                Ok(UpdateOutcome::Conflict)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn create_sync(&self, account: Account) -> Result<()> {
        let cf = self.accounts_cf()?;
        let txn = self.db.transaction();

        if txn.get_for_update_cf(cf, account.id.as_str(), true)?.is_some() {
            return Err(LedgerError::AccountExists(account.id));
        }
        txn.put_cf(cf, account.id.as_str(), encode(&account)?)?;
        txn.commit()?;
        Ok(())
    }
}

fn encode(account: &Account) -> Result<Vec<u8>> {
    serde_json::to_vec(account)
        .map_err(|e| LedgerError::StoreUnavailable(format!("Serialization error: {e}")))
}

fn decode(bytes: &[u8]) -> Result<Account> {
    serde_json::from_slice(bytes)
        .map_err(|e| LedgerError::StoreUnavailable(format!("Deserialization error: {e}")))
}

#[async_trait]
impl AccountStore for RocksDBStore {
    async fn get(&self, id: &AccountId) -> Result<Option<Account>> {
        let cf = self.accounts_cf()?;
        match self.db.get_cf(cf, id.as_str())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn create(&self, account: Account) -> Result<()> {
        self.create_sync(account)
    }

    async fn all_accounts(&self) -> Result<Vec<Account>> {
        let cf = self.accounts_cf()?;

        let mut accounts = Vec::new();
        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item?;
            accounts.push(decode(&value)?);
        }
        Ok(accounts)
    }

    async fn atomic_update(
        &self,
        ids: &BTreeSet<AccountId>,
        update: UpdateFn<'_>,
    ) -> Result<UpdateOutcome> {
        self.update_sync(ids, update)
    }
}
