//! Funds bookkeeping for the escrow engine.
//!
//! Wallets hold each party's available balance; custody holds value
//! locked under a record address (the escrowed amount plus the record's
//! storage allocation). Escrowed funds leave the buyer's wallet
//! entirely — there is no frozen-in-place state, matching the transfer
//! semantics of the protocol.
//!
//! All mutations are check-then-apply: either the full operation
//! succeeds or the ledger is unchanged.

use std::collections::HashMap;

use lockbox_types::{LockboxError, PartyId, Result, StoreAddress};
use rust_decimal::Decimal;

/// Tracks party wallets and per-address custody holdings.
#[derive(Debug, Default)]
pub struct Ledger {
    /// Available balance per party.
    wallets: HashMap<PartyId, Decimal>,
    /// Value held in custody at a record address.
    custody: HashMap<StoreAddress, Decimal>,
}

impl Ledger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self {
            wallets: HashMap::new(),
            custody: HashMap::new(),
        }
    }

    /// External funding (outside the escrow flows proper).
    pub fn deposit(&mut self, party: PartyId, amount: Decimal) {
        *self.wallets.entry(party).or_insert(Decimal::ZERO) += amount;
    }

    /// Remove funds from a party's wallet.
    ///
    /// # Errors
    /// Returns [`LockboxError::InsufficientFunds`] if the wallet cannot
    /// cover `amount`; the wallet is unchanged.
    pub fn debit(&mut self, party: PartyId, amount: Decimal) -> Result<()> {
        let available = self.balance(party);
        if available < amount {
            return Err(LockboxError::InsufficientFunds {
                needed: amount,
                available,
            });
        }
        *self.wallets.entry(party).or_insert(Decimal::ZERO) -= amount;
        Ok(())
    }

    /// Add funds to a party's wallet.
    pub fn credit(&mut self, party: PartyId, amount: Decimal) {
        *self.wallets.entry(party).or_insert(Decimal::ZERO) += amount;
    }

    /// Place value into custody at a record address.
    pub fn custody_credit(&mut self, address: StoreAddress, amount: Decimal) {
        *self.custody.entry(address).or_insert(Decimal::ZERO) += amount;
    }

    /// Release value from custody at a record address. The entry is
    /// removed once its holdings reach zero.
    ///
    /// # Errors
    /// Returns [`LockboxError::CustodyUnderflow`] if the holdings cannot
    /// cover `amount`; custody is unchanged.
    pub fn custody_release(&mut self, address: StoreAddress, amount: Decimal) -> Result<()> {
        let held = self.custody(&address);
        if held < amount {
            return Err(LockboxError::CustodyUnderflow(address));
        }
        let remaining = held - amount;
        if remaining.is_zero() {
            self.custody.remove(&address);
        } else {
            self.custody.insert(address, remaining);
        }
        Ok(())
    }

    /// A party's available balance.
    #[must_use]
    pub fn balance(&self, party: PartyId) -> Decimal {
        self.wallets.get(&party).copied().unwrap_or(Decimal::ZERO)
    }

    /// The holdings in custody at a record address.
    #[must_use]
    pub fn custody(&self, address: &StoreAddress) -> Decimal {
        self.custody.get(address).copied().unwrap_or(Decimal::ZERO)
    }

    /// Sum of every wallet and every custody holding. Constant across
    /// all engine operations except `deposit`.
    #[must_use]
    pub fn total_supply(&self) -> Decimal {
        let wallets: Decimal = self.wallets.values().copied().sum();
        let custody: Decimal = self.custody.values().copied().sum();
        wallets + custody
    }
}
