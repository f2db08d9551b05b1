//! Application layer: the ledger state machine and its public contract.
//!
//! `Ledger` applies single-account mutations, `TransactionCoordinator` turns transfers
//! into one atomic multi-account update, and `AccountService` is the entry point used by
//! the request layer and the batch CLI. None of them own account state; they share an
//! injected `AccountStore` and can be cloned freely across tasks.

pub mod coordinator;
pub mod ledger;
pub mod service;
