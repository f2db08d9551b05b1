use bank_ledger::application::service::AccountService;
use bank_ledger::config::LedgerConfig;
use bank_ledger::domain::account::{Account, AccountId, Balance};
use bank_ledger::domain::ports::{AccountStore, AccountStoreRef};
use bank_ledger::infrastructure::in_memory::InMemoryAccountStore;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::Error;
use std::path::Path;
use std::sync::Arc;

/// Builds a service over a fresh in-memory store holding BANK plus `balances`.
pub async fn seeded_service(balances: &[(&str, Decimal)]) -> (AccountService, AccountStoreRef) {
    let store: AccountStoreRef = Arc::new(InMemoryAccountStore::new());
    for (id, balance) in balances {
        let mut account = Account::new(*id);
        account.balance = Balance::new(*balance);
        store.create(account).await.unwrap();
    }
    let service = AccountService::new(store.clone(), &LedgerConfig::default()).unwrap();
    service.bootstrap().await.unwrap();
    (service, store)
}

pub async fn balance_of(store: &AccountStoreRef, id: &str) -> Decimal {
    store
        .get(&AccountId::from(id))
        .await
        .unwrap()
        .unwrap()
        .balance
        .value()
}

pub async fn total_balance(store: &AccountStoreRef) -> Decimal {
    store
        .all_accounts()
        .await
        .unwrap()
        .iter()
        .map(|a| a.balance.value())
        .sum()
}

pub fn generate_csv(path: &Path, deposits: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["kind", "account", "target", "amount"])?;
    wtr.write_record(["open", "alice", "", ""])?;
    wtr.write_record(["open", "bob", "", ""])?;

    for _ in 0..deposits {
        wtr.write_record(["deposit", "alice", "", "2"])?;
        wtr.write_record(["transfer", "alice", "bob", "1"])?;
    }

    wtr.flush()?;
    Ok(())
}
