//! Configuration for a Lockbox engine instance.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants;

/// Configuration for a single escrow engine deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Seed material under every derived address. Fixed per deployment;
    /// changing it relocates the vault and every transaction.
    pub seed: Vec<u8>,
    /// Minimal storage allocation debited from a record's creator and
    /// held in custody at the record's address. Returned to the buyer
    /// when a settled transaction is closed.
    pub record_rent: Decimal,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: constants::VAULT_SEED.to_vec(),
            record_rent: Decimal::new(1, 3), // 0.001 units per record
        }
    }
}
