//! Audit receipts for the Lockbox escrow engine.
//!
//! Every successful state transition (vault initialized, transaction
//! initiated, confirmed, executed) produces a [`Receipt`] recording who
//! did what, with a SHA-256 hash of the canonical payload. Receipts form
//! an append-only audit trail.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{PartyId, ReceiptId, TxnId};

/// The kind of state transition this receipt records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReceiptKind {
    /// The vault was created and the two parties registered.
    VaultInitialized,
    /// A transaction was created and its amount moved into custody.
    TransactionInitiated,
    /// A party recorded its confirmation slot.
    TransactionConfirmed,
    /// Custody was released to the seller and the record closed.
    TransactionExecuted,
}

impl std::fmt::Display for ReceiptKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VaultInitialized => write!(f, "VAULT_INITIALIZED"),
            Self::TransactionInitiated => write!(f, "TRANSACTION_INITIATED"),
            Self::TransactionConfirmed => write!(f, "TRANSACTION_CONFIRMED"),
            Self::TransactionExecuted => write!(f, "TRANSACTION_EXECUTED"),
        }
    }
}

/// A record of one successful engine operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    /// Unique receipt identifier.
    pub id: ReceiptId,
    /// What kind of transition occurred.
    pub kind: ReceiptKind,
    /// The transaction involved, if any (none for vault initialization).
    pub txn_id: Option<TxnId>,
    /// The party that authorized the operation.
    pub party: PartyId,
    /// The amount moved, if any.
    pub amount: Option<Decimal>,
    /// SHA-256 hash of the canonical payload bytes.
    pub payload_hash: [u8; 32],
    /// When this receipt was issued.
    pub issued_at: DateTime<Utc>,
}

impl Receipt {
    /// Issue a receipt over the given canonical payload.
    #[must_use]
    pub fn issue(
        kind: ReceiptKind,
        party: PartyId,
        txn_id: Option<TxnId>,
        amount: Option<Decimal>,
        payload: &[u8],
    ) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(payload);
        let result = hasher.finalize();
        let mut payload_hash = [0u8; 32];
        payload_hash.copy_from_slice(&result);

        Self {
            id: ReceiptId::new(),
            kind,
            txn_id,
            party,
            amount,
            payload_hash,
            issued_at: Utc::now(),
        }
    }
}
