//! Domain layer: account value objects, the fee rule, and the ports the ledger
//! depends on.

pub mod account;
pub mod fee;
pub mod ports;
pub mod transaction;
