//! # Transaction — a single escrow instance
//!
//! A transaction holds a positive amount in custody until both parties
//! confirm it and the buyer triggers execution.
//!
//! ## State Machine
//!
//! ```text
//!   ┌─────────┐ confirm(buyer)  ┌─────────────────┐
//!   │ CREATED ├────────────────▶│ BUYER_CONFIRMED │
//!   └────┬────┘                 └────────┬────────┘
//!        │ confirm(seller)               │ confirm(seller)
//!        ▼                               ▼
//!   ┌──────────────────┐ confirm  ┌────────────────┐ execute
//!   │ SELLER_CONFIRMED ├─(buyer)─▶│ BOTH_CONFIRMED ├────────▶ settled
//!   └──────────────────┘          └────────────────┘
//! ```
//!
//! Confirmations are commutative (either party may confirm first) and
//! idempotent per party. Execution is enabled only from `BOTH_CONFIRMED`
//! and is one-shot: the record is closed and its address remembered as
//! settled, so no further operation against the id is valid.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{PartyRole, StoreAddress, TxnId};

/// Fixed two-slot confirmation record: slot 0 = buyer, slot 1 = seller.
///
/// The party count is fixed at two, so this is a struct rather than a
/// dynamic collection. Both slots start false; recording a confirmation
/// twice for the same role leaves the record unchanged and never touches
/// the other slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Verifications {
    /// Slot 0: the buyer has confirmed.
    pub buyer: bool,
    /// Slot 1: the seller has confirmed.
    pub seller: bool,
}

impl Verifications {
    /// Both slots false.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a confirmation for the given role. Idempotent.
    pub fn record(&mut self, role: PartyRole) {
        match role {
            PartyRole::Buyer => self.buyer = true,
            PartyRole::Seller => self.seller = true,
        }
    }

    /// Whether both parties have confirmed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.buyer && self.seller
    }

    /// The slots in index order: `[buyer, seller]`.
    #[must_use]
    pub fn as_slots(&self) -> [bool; 2] {
        [self.buyer, self.seller]
    }
}

/// Derived confirmation state of a live transaction.
///
/// The settled state is not represented here: execution closes the
/// record, and the engine's settled guard remembers the address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionState {
    /// No confirmations yet.
    Created,
    /// Only the buyer has confirmed.
    BuyerConfirmed,
    /// Only the seller has confirmed.
    SellerConfirmed,
    /// Both parties have confirmed. Execution is now permitted.
    BothConfirmed,
}

impl std::fmt::Display for TransactionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "CREATED"),
            Self::BuyerConfirmed => write!(f, "BUYER_CONFIRMED"),
            Self::SellerConfirmed => write!(f, "SELLER_CONFIRMED"),
            Self::BothConfirmed => write!(f, "BOTH_CONFIRMED"),
        }
    }
}

/// One escrow instance: an amount in custody plus its confirmation record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Position in the vault's initiation sequence. Immutable.
    pub id: TxnId,
    /// Address of the vault this transaction belongs to.
    pub vault: StoreAddress,
    /// Amount held in custody. Strictly positive.
    pub amount: Decimal,
    /// Bump that produced this record's derived address.
    pub bump: u8,
    /// Two-slot confirmation record.
    pub verifications: Verifications,
    /// When the transaction was initiated.
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a freshly initiated transaction with no confirmations.
    #[must_use]
    pub fn new(id: TxnId, vault: StoreAddress, amount: Decimal, bump: u8) -> Self {
        Self {
            id,
            vault,
            amount,
            bump,
            verifications: Verifications::new(),
            created_at: Utc::now(),
        }
    }

    /// Current confirmation state.
    #[must_use]
    pub fn state(&self) -> TransactionState {
        match (self.verifications.buyer, self.verifications.seller) {
            (false, false) => TransactionState::Created,
            (true, false) => TransactionState::BuyerConfirmed,
            (false, true) => TransactionState::SellerConfirmed,
            (true, true) => TransactionState::BothConfirmed,
        }
    }
}
