use crate::application::service::AccountService;
use crate::domain::account::AccountId;
use crate::domain::transaction::{Transaction, TransactionKind};
use crate::error::{LedgerError, Result};
use serde::Deserialize;
use std::io::Read;

/// The `kind` column: `open` or any transaction kind.
#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Open,
    #[serde(untagged)]
    Transaction(TransactionKind),
}

/// One row of a batch file: `kind, account, target, amount`.
///
/// The amount stays raw text here and is validated by `AccountService::parse_amount`.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct LedgerRecord {
    pub kind: RecordKind,
    pub account: AccountId,
    #[serde(default)]
    pub target: Option<AccountId>,
    #[serde(default)]
    pub amount: Option<String>,
}

/// What a batch row asks the service to do.
#[derive(Debug, PartialEq, Clone)]
pub enum Command {
    Open(AccountId),
    Apply(Transaction),
}

impl LedgerRecord {
    pub fn into_command(self) -> Result<Command> {
        let kind = match self.kind {
            RecordKind::Open => return Ok(Command::Open(self.account)),
            RecordKind::Transaction(kind) => kind,
        };
        let raw = self
            .amount
            .ok_or_else(|| LedgerError::InvalidAmount("missing amount".to_string()))?;
        let amount = AccountService::parse_amount(&raw)?;

        if kind == TransactionKind::Transfer {
            let Some(target) = self.target else {
                return Err(LedgerError::MissingRecipient(self.account));
            };
            return Ok(Command::Apply(Transaction::transfer(self.account, target, amount)));
        }
        Ok(Command::Apply(Transaction::new(kind, self.account, amount)))
    }
}

/// Reads ledger records from a CSV source.
///
/// Wraps `csv::Reader`, trimming whitespace and accepting short rows, and yields one
/// `Result` per record so a bad row never stops the stream.
pub struct TransactionReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> TransactionReader<R> {
    /// Creates a new `TransactionReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes records.
    pub fn records(self) -> impl Iterator<Item = Result<LedgerRecord>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(LedgerError::from))
    }
}
