use bank_ledger::application::service::AccountService;
use bank_ledger::config::LedgerConfig;
use bank_ledger::domain::ports::AccountStoreRef;
use bank_ledger::infrastructure::in_memory::InMemoryAccountStore;
#[cfg(feature = "storage-rocksdb")]
use bank_ledger::infrastructure::rocksdb::RocksDBStore;
use bank_ledger::interfaces::csv::account_writer::AccountWriter;
use bank_ledger::interfaces::csv::transaction_reader::{Command, TransactionReader};
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use rust_decimal::Decimal;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input CSV file with `kind, account, target, amount` rows
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// JSON config file with `fee`, `max_retries` and `max_debt`
    #[arg(long)]
    config: Option<PathBuf>,

    /// Flat fee credited to BANK on deposits and transfers
    #[arg(long)]
    fee: Option<Decimal>,

    /// Attempts per update before giving up on a conflicting store
    #[arg(long)]
    max_retries: Option<u32>,
}

fn open_store(db_path: Option<PathBuf>) -> Result<AccountStoreRef> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            let store = RocksDBStore::open(path).into_diagnostic()?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(path) => {
            warn!(
                path = %path.display(),
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
            );
            Ok(Arc::new(InMemoryAccountStore::new()))
        }
        None => Ok(Arc::new(InMemoryAccountStore::new())),
    }
}

fn load_config(cli: &Cli) -> Result<LedgerConfig> {
    let mut config = match &cli.config {
        Some(path) => LedgerConfig::from_path(path).into_diagnostic()?,
        None => LedgerConfig::default(),
    };
    if let Some(fee) = cli.fee {
        config.fee = fee;
    }
    if let Some(max_retries) = cli.max_retries {
        config.max_retries = max_retries;
    }
    config.validate().into_diagnostic()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let store = open_store(cli.db_path)?;

    let service = AccountService::new(store, &config).into_diagnostic()?;
    service.bootstrap().await.into_diagnostic()?;

    let file = File::open(cli.input).into_diagnostic()?;
    let reader = TransactionReader::new(file);
    for (row, record) in reader.records().enumerate() {
        // Header is line 1.
        let line = row + 2;
        let command = match record.and_then(|record| record.into_command()) {
            Ok(command) => command,
            Err(e) => {
                warn!(line, error = %e, "Error reading record");
                continue;
            }
        };
        let result = match command {
            Command::Open(id) => service.open_account(id).await.map(|_| ()),
            Command::Apply(tx) => service.execute(tx).await.map(|_| ()),
        };
        if let Err(e) = result {
            warn!(line, error = %e, "Rejected transaction");
        }
    }

    let accounts = service.accounts().await.into_diagnostic()?;

    let stdout = io::stdout();
    let mut writer = AccountWriter::new(stdout.lock());
    writer.write_accounts(accounts).into_diagnostic()?;

    Ok(())
}
