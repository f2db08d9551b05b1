use crate::domain::fee::FeePolicy;
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Tunables shared by the ledger, the coordinator and the service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerConfig {
    /// Flat fee credited to BANK on every deposit and transfer.
    pub fee: Decimal,
    /// Attempts at a read-compute-write cycle before reporting the store unavailable.
    pub max_retries: u32,
    /// Upper bound on an account's debt. `None` means loans are uncapped.
    pub max_debt: Option<Decimal>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            fee: dec!(1),
            max_retries: 8,
            max_debt: None,
        }
    }
}

impl LedgerConfig {
    /// Loads a JSON config file. Missing keys take their default values.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let config: Self = serde_json::from_reader(reader).map_err(|e| {
            LedgerError::Config(format!("failed to parse {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_retries == 0 {
            return Err(LedgerError::Config(
                "max_retries must be at least 1".to_string(),
            ));
        }
        if let Some(limit) = self.max_debt
            && limit < Decimal::ZERO
        {
            return Err(LedgerError::Config(format!(
                "max_debt must not be negative, got {limit}"
            )));
        }
        self.fee_policy().map(|_| ())
    }

    pub fn fee_policy(&self) -> Result<FeePolicy> {
        FeePolicy::flat(self.fee)
    }
}
