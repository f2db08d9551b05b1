use super::account::{Account, AccountId};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// The accounts visible to one atomic update, keyed (and therefore ordered) by id.
pub type AccountSet = BTreeMap<AccountId, Account>;

/// Mutation applied inside `AccountStore::atomic_update`.
///
/// Returning `Err` aborts the update without writing anything. The function may be
/// invoked again if the store reports a conflict, so it must not have side effects.
pub type UpdateFn<'a> = &'a (dyn Fn(&mut AccountSet) -> Result<()> + Send + Sync);

/// Result of a single `atomic_update` attempt.
#[derive(Debug, PartialEq)]
pub enum UpdateOutcome {
    /// Every account in the set was written. Carries the committed state.
    Committed(AccountSet),
    /// A concurrent writer touched one of the keys first. Nothing was written.
    Conflict,
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn get(&self, id: &AccountId) -> Result<Option<Account>>;

    /// Inserts a new account. Fails with `AccountExists` if the id is taken.
    async fn create(&self, account: Account) -> Result<()>;

    async fn all_accounts(&self) -> Result<Vec<Account>>;

    /// Reads every existing account in `ids`, applies `update`, and commits all of them
    /// or none of them. Ids without a record are simply absent from the set.
    async fn atomic_update(
        &self,
        ids: &BTreeSet<AccountId>,
        update: UpdateFn<'_>,
    ) -> Result<UpdateOutcome>;
}

/// Verifies caller credentials on behalf of the request layer.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn verify(&self, account: &AccountId, credential: &str) -> bool;
}

pub type AccountStoreRef = Arc<dyn AccountStore>;
pub type AuthenticatorRef = Arc<dyn Authenticator>;
