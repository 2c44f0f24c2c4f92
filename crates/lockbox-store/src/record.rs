//! The two record kinds that live in the key-addressed store.

use lockbox_types::{Transaction, Vault};
use serde::{Deserialize, Serialize};

/// A stored record: either the singleton vault or one escrow transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Record {
    Vault(Vault),
    Transaction(Transaction),
}

impl Record {
    /// Record kind label for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Vault(_) => "vault",
            Self::Transaction(_) => "transaction",
        }
    }

    #[must_use]
    pub fn as_vault(&self) -> Option<&Vault> {
        match self {
            Self::Vault(vault) => Some(vault),
            Self::Transaction(_) => None,
        }
    }

    #[must_use]
    pub fn as_vault_mut(&mut self) -> Option<&mut Vault> {
        match self {
            Self::Vault(vault) => Some(vault),
            Self::Transaction(_) => None,
        }
    }

    #[must_use]
    pub fn as_transaction(&self) -> Option<&Transaction> {
        match self {
            Self::Transaction(txn) => Some(txn),
            Self::Vault(_) => None,
        }
    }

    #[must_use]
    pub fn as_transaction_mut(&mut self) -> Option<&mut Transaction> {
        match self {
            Self::Transaction(txn) => Some(txn),
            Self::Vault(_) => None,
        }
    }
}
