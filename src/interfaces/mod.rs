//! Adapters between the ledger and the outside world: CSV batch files and the
//! credentialed request layer.

pub mod api;
pub mod csv;
