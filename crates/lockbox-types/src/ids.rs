//! Identifiers used throughout Lockbox.
//!
//! Parties are identified by their raw ed25519 public key; transactions
//! by their position in the vault's initiation sequence. Receipt IDs use
//! UUIDv7 for time-ordered lexicographic sorting.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// PartyId
// ---------------------------------------------------------------------------

/// Identity of an escrow party (buyer or seller).
/// This is the raw ed25519 public key (32 bytes). Key management and
/// signing live outside the engine; operations only compare identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct PartyId(pub [u8; 32]);

impl PartyId {
    #[must_use]
    pub fn from_pubkey(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "party:{}", hex::encode(&self.0[..8]))
    }
}

/// Fresh identities for tests, backed by real ed25519 keypairs.
/// **Never use in production** — the secret key is discarded.
#[cfg(any(test, feature = "test-helpers"))]
impl PartyId {
    #[must_use]
    pub fn generate() -> Self {
        let signing = ed25519_dalek::SigningKey::generate(&mut rand::rngs::OsRng);
        Self(signing.verifying_key().to_bytes())
    }
}

// ---------------------------------------------------------------------------
// TxnId
// ---------------------------------------------------------------------------

/// Position of a transaction in the vault's initiation sequence (0-based).
///
/// Equal to the vault's `num_transactions` at the moment of creation, and
/// immutable once assigned. The little-endian encoding of this id is the
/// variable part of the transaction's derived-address seed material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TxnId(pub u64);

impl TxnId {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// The 8-byte little-endian encoding used as seed material.
    #[must_use]
    pub fn to_le_bytes(self) -> [u8; 8] {
        self.0.to_le_bytes()
    }
}

impl fmt::Display for TxnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "txn:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ReceiptId
// ---------------------------------------------------------------------------

/// Unique identifier for an audit receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ReceiptId(pub Uuid);

impl ReceiptId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ReceiptId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReceiptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rcpt:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
