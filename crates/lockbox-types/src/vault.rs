//! The Vault record — root of trust for an escrow deployment.
//!
//! The vault exists at most once per deployment, at the address derived
//! from the fixed protocol seed. It records the two authorized parties
//! (immutable after initialization) and the monotonically increasing
//! count of transactions ever initiated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{PartyId, TxnId};

/// Which of the two registered parties a caller is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartyRole {
    /// The paying party. Initiates transactions and triggers execution.
    Buyer,
    /// The receiving party. Confirms transactions and receives funds.
    Seller,
}

impl PartyRole {
    /// Verification slot index: buyer = 0, seller = 1.
    #[must_use]
    pub fn slot(self) -> usize {
        match self {
            Self::Buyer => 0,
            Self::Seller => 1,
        }
    }
}

impl std::fmt::Display for PartyRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buyer => write!(f, "BUYER"),
            Self::Seller => write!(f, "SELLER"),
        }
    }
}

/// Singleton record holding the two escrow parties and the transaction
/// counter that assigns every [`TxnId`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vault {
    /// The paying party. Immutable after initialization.
    pub buyer: PartyId,
    /// The receiving party. Immutable after initialization.
    pub seller: PartyId,
    /// Bump that produced this record's derived address.
    pub bump: u8,
    /// Count of transactions ever initiated. Starts at 0, incremented by
    /// exactly 1 on every successful initiation, never decremented.
    pub num_transactions: u64,
    /// When the vault was initialized.
    pub created_at: DateTime<Utc>,
}

impl Vault {
    /// Create a freshly initialized vault with a zero counter.
    #[must_use]
    pub fn new(buyer: PartyId, seller: PartyId, bump: u8) -> Self {
        Self {
            buyer,
            seller,
            bump,
            num_transactions: 0,
            created_at: Utc::now(),
        }
    }

    /// Resolve a caller identity to its registered role.
    ///
    /// The buyer wins if one key is somehow registered as both parties.
    #[must_use]
    pub fn party_role(&self, party: PartyId) -> Option<PartyRole> {
        if party == self.buyer {
            Some(PartyRole::Buyer)
        } else if party == self.seller {
            Some(PartyRole::Seller)
        } else {
            None
        }
    }

    /// The id the next initiated transaction will receive.
    #[must_use]
    pub fn next_transaction_id(&self) -> TxnId {
        TxnId(self.num_transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_vault() -> (Vault, PartyId, PartyId) {
        let buyer = PartyId::generate();
        let seller = PartyId::generate();
        (Vault::new(buyer, seller, 255), buyer, seller)
    }

    #[test]
    fn fresh_vault_has_zero_counter() {
        let (vault, _, _) = make_vault();
        assert_eq!(vault.num_transactions, 0);
        assert_eq!(vault.next_transaction_id(), TxnId(0));
    }

    #[test]
    fn party_role_resolution() {
        let (vault, buyer, seller) = make_vault();
        assert_eq!(vault.party_role(buyer), Some(PartyRole::Buyer));
        assert_eq!(vault.party_role(seller), Some(PartyRole::Seller));
        assert_eq!(vault.party_role(PartyId::generate()), None);
    }

    #[test]
    fn role_slots() {
        assert_eq!(PartyRole::Buyer.slot(), 0);
        assert_eq!(PartyRole::Seller.slot(), 1);
    }

    #[test]
    fn role_display() {
        assert_eq!(format!("{}", PartyRole::Buyer), "BUYER");
        assert_eq!(format!("{}", PartyRole::Seller), "SELLER");
    }

    #[test]
    fn serde_roundtrip() {
        let (vault, _, _) = make_vault();
        let json = serde_json::to_string(&vault).unwrap();
        let back: Vault = serde_json::from_str(&json).unwrap();
        assert_eq!(vault.buyer, back.buyer);
        assert_eq!(vault.seller, back.seller);
        assert_eq!(vault.num_transactions, back.num_transactions);
    }
}
