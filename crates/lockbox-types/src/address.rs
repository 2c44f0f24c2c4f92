//! Deterministic storage addressing.
//!
//! Every record's location is a pure function of fixed seed material:
//! the vault's address depends only on the protocol seed, and each
//! transaction's address on the 8-byte little-endian encoding of its id
//! concatenated with the same seed. Any party can recompute any record's
//! address from a numeric id alone — no directory or index exists.
//!
//! Derivation appends a one-byte **bump**, searched from 255 downward,
//! and accepts the first candidate that does not decode as an ed25519
//! public key. A derived address can therefore never be confused with a
//! party identity. The search fails only if all 256 candidates decode
//! (probability ~2^-256), which is treated as a fatal configuration
//! error.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{LockboxError, Result, TxnId};

// ---------------------------------------------------------------------------
// StoreAddress
// ---------------------------------------------------------------------------

/// A storage location in the key-addressed record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct StoreAddress(pub [u8; 32]);

impl StoreAddress {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for StoreAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "addr:{}", hex::encode(&self.0[..8]))
    }
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// SHA-256 candidate for the given seed material and bump.
fn candidate(material: &[&[u8]], bump: u8) -> StoreAddress {
    let mut hasher = Sha256::new();
    hasher.update(b"lockbox:addr:v1:");
    for part in material {
        hasher.update(part);
    }
    hasher.update([bump]);
    let result = hasher.finalize();
    let mut address = [0u8; 32];
    address.copy_from_slice(&result);
    StoreAddress(address)
}

/// A candidate is rejected if it decodes as an ed25519 public key —
/// storage addresses must never collide with the identity space.
fn decodes_as_identity(address: &StoreAddress) -> bool {
    ed25519_dalek::VerifyingKey::from_bytes(address.as_bytes()).is_ok()
}

/// Derive an address and its bump from the given seed material.
///
/// Identical inputs always yield identical outputs; distinct inputs
/// yield distinct addresses (a collision would be a SHA-256 collision).
///
/// # Errors
/// Returns [`LockboxError::AddressDerivation`] if no bump in `0..=255`
/// yields a valid address. Not expected in normal operation.
pub fn derive_address(material: &[&[u8]]) -> Result<(StoreAddress, u8)> {
    for bump in (0..=u8::MAX).rev() {
        let address = candidate(material, bump);
        if !decodes_as_identity(&address) {
            return Ok((address, bump));
        }
    }
    Err(LockboxError::AddressDerivation)
}

/// Address of the singleton vault. Depends only on the protocol seed.
pub fn derive_vault_address(seed: &[u8]) -> Result<(StoreAddress, u8)> {
    derive_address(&[seed])
}

/// Address of the transaction with the given id: the 8-byte little-endian
/// id concatenated with the protocol seed.
pub fn derive_transaction_address(seed: &[u8], id: TxnId) -> Result<(StoreAddress, u8)> {
    let id_bytes = id.to_le_bytes();
    derive_address(&[id_bytes.as_slice(), seed])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
