pub mod account_writer;
pub mod transaction_reader;
