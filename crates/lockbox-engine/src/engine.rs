//! The escrow state machine.
//!
//! `EscrowEngine` owns the record store, the funds ledger, and the
//! settled guard, and is the only component permitted to mutate stored
//! state. Operations are serialized (`&mut self`) all-or-nothing
//! transitions: every precondition is checked before the first write,
//! and the writes that follow cannot fail, so a partial application is
//! never observable.
//!
//! Racing initiations for one counter value are decided by the
//! address-match and create-collision checks: exactly one winner; the
//! loser re-reads the counter and re-derives its target address before
//! resubmitting.

use lockbox_store::{Record, RecordStore};
use lockbox_types::{
    EngineConfig, LockboxError, PartyId, Receipt, ReceiptKind, Result, StoreAddress, Transaction,
    TxnId, Vault, constants, derive_transaction_address, derive_vault_address,
};
use rust_decimal::Decimal;

use crate::ledger::Ledger;
use crate::settled::SettledGuard;

/// The escrow engine: four operations plus read-only queries.
#[derive(Debug)]
pub struct EscrowEngine {
    config: EngineConfig,
    store: RecordStore,
    ledger: Ledger,
    settled: SettledGuard,
    receipts: Vec<Receipt>,
}

impl EscrowEngine {
    /// Create an engine with the given configuration and empty state.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            store: RecordStore::new(),
            ledger: Ledger::new(),
            settled: SettledGuard::new(constants::SETTLED_CACHE_SIZE),
            receipts: Vec::new(),
        }
    }

    // =================================================================
    // Address derivation
    // =================================================================

    /// Derived address and bump of the singleton vault.
    pub fn vault_address(&self) -> Result<(StoreAddress, u8)> {
        derive_vault_address(&self.config.seed)
    }

    /// Derived address and bump of the transaction with the given id.
    /// Any caller can recompute this from the numeric id alone.
    pub fn transaction_address(&self, id: TxnId) -> Result<(StoreAddress, u8)> {
        derive_transaction_address(&self.config.seed, id)
    }

    /// Derived address and bump for the *next* transaction, from the
    /// current counter value. Clients call this (or re-derive after a
    /// lost race) before initiating.
    pub fn next_transaction_address(&self) -> Result<(StoreAddress, u8)> {
        let id = self.vault()?.next_transaction_id();
        self.transaction_address(id)
    }

    // =================================================================
    // Read-only queries
    // =================================================================

    /// The vault record.
    ///
    /// # Errors
    /// Returns [`LockboxError::VaultNotFound`] before initialization.
    pub fn vault(&self) -> Result<&Vault> {
        let (address, _) = self.vault_address()?;
        self.store
            .get(&address)
            .and_then(Record::as_vault)
            .ok_or(LockboxError::VaultNotFound)
    }

    /// Current transaction counter.
    pub fn num_transactions(&self) -> Result<u64> {
        Ok(self.vault()?.num_transactions)
    }

    /// The live transaction record at an address, if any.
    #[must_use]
    pub fn transaction(&self, address: &StoreAddress) -> Option<&Transaction> {
        self.store.get(address).and_then(Record::as_transaction)
    }

    /// Whether the transaction at this address has been settled.
    #[must_use]
    pub fn is_settled(&self, address: &StoreAddress) -> bool {
        self.settled.is_settled(address)
    }

    /// A party's available balance.
    #[must_use]
    pub fn balance(&self, party: PartyId) -> Decimal {
        self.ledger.balance(party)
    }

    /// Holdings in custody at a record address.
    #[must_use]
    pub fn custody(&self, address: &StoreAddress) -> Decimal {
        self.ledger.custody(address)
    }

    /// The append-only audit trail.
    #[must_use]
    pub fn receipts(&self) -> &[Receipt] {
        &self.receipts
    }

    /// Sum of every wallet and custody holding — constant across all
    /// operations except [`deposit`](Self::deposit).
    #[must_use]
    pub fn total_supply(&self) -> Decimal {
        self.ledger.total_supply()
    }

    /// External funding for a party's wallet.
    pub fn deposit(&mut self, party: PartyId, amount: Decimal) {
        self.ledger.deposit(party, amount);
    }

    // =================================================================
    // Operations
    // =================================================================

    /// One-time vault setup: registers the two parties and zeroes the
    /// counter. Any caller may initialize; the caller funds the vault's
    /// storage allocation.
    ///
    /// # Errors
    /// - [`LockboxError::AddressMismatch`] if `bump` is not the derived
    ///   vault bump
    /// - [`LockboxError::AlreadyInitialized`] on any second call
    /// - [`LockboxError::InsufficientFunds`] if the caller cannot fund
    ///   the allocation
    pub fn initialize(
        &mut self,
        caller: PartyId,
        buyer: PartyId,
        seller: PartyId,
        bump: u8,
    ) -> Result<StoreAddress> {
        let (address, expected_bump) = self.vault_address()?;
        if bump != expected_bump {
            return Err(LockboxError::AddressMismatch {
                reason: format!("vault bump {bump} does not match derived bump {expected_bump}"),
            });
        }
        if self.store.contains(&address) {
            return Err(LockboxError::AlreadyInitialized(address));
        }

        // Last fallible precondition doubles as the first write.
        self.ledger.debit(caller, self.config.record_rent)?;
        self.ledger.custody_credit(address, self.config.record_rent);
        self.store
            .create(address, Record::Vault(Vault::new(buyer, seller, bump)))?;

        tracing::info!(vault = %address, %buyer, %seller, "vault initialized");
        self.push_receipt(ReceiptKind::VaultInitialized, caller, None, None, address);
        Ok(address)
    }

    /// Create a new escrow transaction and move its amount (plus the
    /// record's storage allocation) from the buyer's wallet into
    /// custody. The counter increment and the record creation apply as
    /// one atomic unit.
    ///
    /// `txn_address` and `bump` must be the derivation for the *current*
    /// counter value; a stale pair (lost race) is rejected before any
    /// state changes.
    ///
    /// # Errors
    /// - [`LockboxError::VaultNotFound`] before initialization
    /// - [`LockboxError::Unauthorized`] if the caller is not the
    ///   registered buyer
    /// - [`LockboxError::InvalidAmount`] if `amount` is not positive
    /// - [`LockboxError::AddressMismatch`] on a stale address or bump
    /// - [`LockboxError::AddressCollision`] if the slot is occupied
    /// - [`LockboxError::InsufficientFunds`] if the buyer cannot cover
    ///   `amount` plus the allocation
    pub fn initiate_transaction(
        &mut self,
        caller: PartyId,
        amount: Decimal,
        txn_address: StoreAddress,
        bump: u8,
    ) -> Result<TxnId> {
        let (vault_address, _) = self.vault_address()?;
        let vault = self
            .store
            .get(&vault_address)
            .and_then(Record::as_vault)
            .ok_or(LockboxError::VaultNotFound)?;
        if caller != vault.buyer {
            return Err(LockboxError::Unauthorized {
                party: caller,
                operation: "initiate a transaction".into(),
            });
        }
        if amount <= Decimal::ZERO {
            return Err(LockboxError::InvalidAmount { amount });
        }

        let id = vault.next_transaction_id();
        let (expected_address, expected_bump) = self.transaction_address(id)?;
        if txn_address != expected_address || bump != expected_bump {
            return Err(LockboxError::AddressMismatch {
                reason: format!(
                    "transaction {id} derives to {expected_address} with bump {expected_bump}"
                ),
            });
        }
        if self.store.contains(&expected_address) {
            return Err(LockboxError::AddressCollision(expected_address));
        }

        let total = amount + self.config.record_rent;
        // Last fallible precondition doubles as the first write.
        self.ledger.debit(caller, total)?;
        self.ledger.custody_credit(expected_address, total);
        self.store.create(
            expected_address,
            Record::Transaction(Transaction::new(id, vault_address, amount, expected_bump)),
        )?;
        // Counter increment belongs to the same atomic unit as the
        // record creation; neither is ever observable without the other.
        self.store
            .get_mut(&vault_address)
            .and_then(Record::as_vault_mut)
            .ok_or(LockboxError::VaultNotFound)?
            .num_transactions += 1;

        tracing::info!(txn = %expected_address, %id, %amount, "transaction initiated");
        self.push_receipt(
            ReceiptKind::TransactionInitiated,
            caller,
            Some(id),
            Some(amount),
            expected_address,
        );
        Ok(id)
    }

    /// Record the caller's confirmation slot on a live transaction.
    /// Idempotent per party; never touches the other party's slot.
    /// Buyer and seller may confirm in either order.
    ///
    /// # Errors
    /// - [`LockboxError::AlreadySettled`] if the transaction was
    ///   executed and closed
    /// - [`LockboxError::TransactionNotFound`] if no record exists at
    ///   the address
    /// - [`LockboxError::Unauthorized`] if the caller is neither the
    ///   vault's buyer nor its seller
    pub fn confirm_transaction(&mut self, caller: PartyId, txn_address: StoreAddress) -> Result<()> {
        if self.settled.is_settled(&txn_address) {
            return Err(LockboxError::AlreadySettled(txn_address));
        }
        let txn = self
            .store
            .get(&txn_address)
            .and_then(Record::as_transaction)
            .ok_or(LockboxError::TransactionNotFound(txn_address))?;
        let id = txn.id;
        let vault_address = txn.vault;
        let role = self
            .store
            .get(&vault_address)
            .and_then(Record::as_vault)
            .ok_or(LockboxError::VaultNotFound)?
            .party_role(caller)
            .ok_or_else(|| LockboxError::Unauthorized {
                party: caller,
                operation: "confirm this transaction".into(),
            })?;

        let txn = self
            .store
            .get_mut(&txn_address)
            .and_then(Record::as_transaction_mut)
            .ok_or(LockboxError::TransactionNotFound(txn_address))?;
        txn.verifications.record(role);
        let state = txn.state();

        tracing::debug!(txn = %txn_address, %id, %role, %state, "confirmation recorded");
        self.push_receipt(
            ReceiptKind::TransactionConfirmed,
            caller,
            Some(id),
            None,
            txn_address,
        );
        Ok(())
    }

    /// Release escrowed funds to the seller. Buyer-triggered only, and
    /// only once both verification slots are true. Terminal: the record
    /// is closed (its storage allocation returns to the buyer) and the
    /// address is remembered as settled.
    ///
    /// # Errors
    /// - [`LockboxError::AlreadySettled`] on repeat execution
    /// - [`LockboxError::TransactionNotFound`] if no record exists at
    ///   the address
    /// - [`LockboxError::Unauthorized`] if the caller is not the
    ///   registered buyer
    /// - [`LockboxError::NotFullyConfirmed`] if either slot is false
    pub fn execute_transaction(&mut self, caller: PartyId, txn_address: StoreAddress) -> Result<()> {
        if self.settled.is_settled(&txn_address) {
            return Err(LockboxError::AlreadySettled(txn_address));
        }
        let txn = self
            .store
            .get(&txn_address)
            .and_then(Record::as_transaction)
            .ok_or(LockboxError::TransactionNotFound(txn_address))?;
        let id = txn.id;
        let amount = txn.amount;
        let verifications = txn.verifications;
        let vault = self
            .store
            .get(&txn.vault)
            .and_then(Record::as_vault)
            .ok_or(LockboxError::VaultNotFound)?;
        let buyer = vault.buyer;
        let seller = vault.seller;
        if caller != buyer {
            return Err(LockboxError::Unauthorized {
                party: caller,
                operation: "execute this transaction".into(),
            });
        }
        if !verifications.is_complete() {
            return Err(LockboxError::NotFullyConfirmed {
                buyer: verifications.buyer,
                seller: verifications.seller,
            });
        }

        // Drain custody: the escrowed amount to the seller, the
        // storage-allocation residual back to the buyer.
        let held = self.ledger.custody(&txn_address);
        let residual = held - amount;
        self.ledger.custody_release(txn_address, held)?;
        self.ledger.credit(seller, amount);
        if residual > Decimal::ZERO {
            self.ledger.credit(buyer, residual);
        }
        self.store.close(&txn_address);
        self.settled.mark_settled(txn_address)?;

        tracing::info!(txn = %txn_address, %id, %amount, %seller, "transaction executed");
        self.push_receipt(
            ReceiptKind::TransactionExecuted,
            caller,
            Some(id),
            Some(amount),
            txn_address,
        );
        Ok(())
    }

    /// Append an audit receipt over the canonical payload bytes.
    fn push_receipt(
        &mut self,
        kind: ReceiptKind,
        party: PartyId,
        txn_id: Option<TxnId>,
        amount: Option<Decimal>,
        address: StoreAddress,
    ) {
        let mut payload = Vec::with_capacity(96);
        payload.extend_from_slice(b"lockbox:receipt:v1:");
        payload.extend_from_slice(kind.to_string().as_bytes());
        payload.extend_from_slice(party.as_bytes());
        payload.extend_from_slice(address.as_bytes());
        if let Some(id) = txn_id {
            payload.extend_from_slice(&id.to_le_bytes());
        }
        if let Some(amount) = amount {
            payload.extend_from_slice(amount.to_string().as_bytes());
        }
        self.receipts.push(Receipt::issue(kind, party, txn_id, amount, &payload));
    }
}

impl Default for EscrowEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Engine with a funded buyer and seller, vault not yet initialized.
    fn setup() -> (EscrowEngine, PartyId, PartyId) {
        let mut engine = EscrowEngine::default();
        let buyer = PartyId::generate();
        let seller = PartyId::generate();
        engine.deposit(buyer, Decimal::new(1000, 0));
        engine.deposit(seller, Decimal::new(10, 0));
        (engine, buyer, seller)
    }

    /// Engine with the vault initialized by the buyer.
    fn initialized() -> (EscrowEngine, PartyId, PartyId) {
        let (mut engine, buyer, seller) = setup();
        let (_, bump) = engine.vault_address().unwrap();
        engine.initialize(buyer, buyer, seller, bump).unwrap();
        (engine, buyer, seller)
    }

    fn initiate(engine: &mut EscrowEngine, buyer: PartyId, amount: Decimal) -> (TxnId, StoreAddress) {
        let (address, bump) = engine.next_transaction_address().unwrap();
        let id = engine
            .initiate_transaction(buyer, amount, address, bump)
            .unwrap();
        (id, address)
    }

    #[test]
    fn initialize_registers_parties() {
        let (engine, buyer, seller) = initialized();
        let vault = engine.vault().unwrap();
        assert_eq!(vault.buyer, buyer);
        assert_eq!(vault.seller, seller);
        assert_eq!(vault.num_transactions, 0);
    }

    #[test]
    fn second_initialize_fails() {
        let (mut engine, buyer, seller) = initialized();
        let (_, bump) = engine.vault_address().unwrap();
        let err = engine.initialize(buyer, buyer, seller, bump).unwrap_err();
        assert!(matches!(err, LockboxError::AlreadyInitialized(_)));
    }

    #[test]
    fn initialize_with_wrong_bump_fails() {
        let (mut engine, buyer, seller) = setup();
        let (_, bump) = engine.vault_address().unwrap();
        let err = engine
            .initialize(buyer, buyer, seller, bump.wrapping_add(1))
            .unwrap_err();
        assert!(matches!(err, LockboxError::AddressMismatch { .. }));
        assert!(matches!(
            engine.vault().unwrap_err(),
            LockboxError::VaultNotFound
        ));
    }

    #[test]
    fn operations_before_initialize_fail() {
        let (mut engine, buyer, _) = setup();
        assert!(matches!(
            engine.num_transactions().unwrap_err(),
            LockboxError::VaultNotFound
        ));
        let (address, bump) = engine.transaction_address(TxnId(0)).unwrap();
        let err = engine
            .initiate_transaction(buyer, Decimal::ONE, address, bump)
            .unwrap_err();
        assert!(matches!(err, LockboxError::VaultNotFound));
    }

    #[test]
    fn initiate_creates_unconfirmed_transaction() {
        let (mut engine, buyer, _) = initialized();
        let (id, address) = initiate(&mut engine, buyer, Decimal::new(2, 0));

        assert_eq!(id, TxnId(0));
        assert_eq!(engine.num_transactions().unwrap(), 1);

        let txn = engine.transaction(&address).unwrap();
        assert_eq!(txn.amount, Decimal::new(2, 0));
        assert_eq!(txn.verifications.as_slots(), [false, false]);
    }

    #[test]
    fn initiate_escrows_amount_plus_allocation() {
        let (mut engine, buyer, _) = initialized();
        let rent = EngineConfig::default().record_rent;
        let before = engine.balance(buyer);

        let (_, address) = initiate(&mut engine, buyer, Decimal::new(2, 0));

        assert_eq!(engine.balance(buyer), before - Decimal::new(2, 0) - rent);
        assert_eq!(engine.custody(&address), Decimal::new(2, 0) + rent);
    }

    #[test]
    fn initiate_by_non_buyer_fails_and_counter_unchanged() {
        let (mut engine, _, seller) = initialized();
        let (address, bump) = engine.next_transaction_address().unwrap();
        let err = engine
            .initiate_transaction(seller, Decimal::ONE, address, bump)
            .unwrap_err();
        assert!(matches!(err, LockboxError::Unauthorized { .. }));
        assert_eq!(engine.num_transactions().unwrap(), 0);
        assert!(engine.transaction(&address).is_none());
    }

    #[test]
    fn initiate_rejects_non_positive_amounts() {
        let (mut engine, buyer, _) = initialized();
        let (address, bump) = engine.next_transaction_address().unwrap();
        for amount in [Decimal::ZERO, Decimal::new(-5, 0)] {
            let err = engine
                .initiate_transaction(buyer, amount, address, bump)
                .unwrap_err();
            assert!(matches!(err, LockboxError::InvalidAmount { .. }));
        }
        assert_eq!(engine.num_transactions().unwrap(), 0);
    }

    #[test]
    fn initiate_with_stale_derivation_fails() {
        let (mut engine, buyer, _) = initialized();
        // A client derives for counter 0, then loses the race.
        let (stale_address, stale_bump) = engine.next_transaction_address().unwrap();
        initiate(&mut engine, buyer, Decimal::ONE);

        let err = engine
            .initiate_transaction(buyer, Decimal::ONE, stale_address, stale_bump)
            .unwrap_err();
        assert!(matches!(err, LockboxError::AddressMismatch { .. }));
        assert_eq!(engine.num_transactions().unwrap(), 1);

        // Re-deriving from fresh state succeeds.
        let (id, _) = initiate(&mut engine, buyer, Decimal::ONE);
        assert_eq!(id, TxnId(1));
    }

    #[test]
    fn initiate_insufficient_funds_leaves_state_unchanged() {
        let (mut engine, buyer, _) = initialized();
        let (address, bump) = engine.next_transaction_address().unwrap();
        let before = engine.balance(buyer);

        let err = engine
            .initiate_transaction(buyer, Decimal::new(1_000_000, 0), address, bump)
            .unwrap_err();
        assert!(matches!(err, LockboxError::InsufficientFunds { .. }));
        assert_eq!(engine.balance(buyer), before);
        assert_eq!(engine.num_transactions().unwrap(), 0);
        assert!(engine.transaction(&address).is_none());
    }

    #[test]
    fn confirm_by_stranger_fails() {
        let (mut engine, buyer, _) = initialized();
        let (_, address) = initiate(&mut engine, buyer, Decimal::ONE);

        let stranger = PartyId::generate();
        let err = engine.confirm_transaction(stranger, address).unwrap_err();
        assert!(matches!(err, LockboxError::Unauthorized { .. }));

        let txn = engine.transaction(&address).unwrap();
        assert_eq!(txn.verifications.as_slots(), [false, false]);
    }

    #[test]
    fn confirm_unknown_address_fails() {
        let (mut engine, buyer, _) = initialized();
        let (address, _) = engine.transaction_address(TxnId(9)).unwrap();
        let err = engine.confirm_transaction(buyer, address).unwrap_err();
        assert!(matches!(err, LockboxError::TransactionNotFound(_)));
    }

    #[test]
    fn execute_requires_both_confirmations() {
        let (mut engine, buyer, _) = initialized();
        let (_, address) = initiate(&mut engine, buyer, Decimal::ONE);

        let err = engine.execute_transaction(buyer, address).unwrap_err();
        assert!(matches!(
            err,
            LockboxError::NotFullyConfirmed {
                buyer: false,
                seller: false
            }
        ));

        engine.confirm_transaction(buyer, address).unwrap();
        let err = engine.execute_transaction(buyer, address).unwrap_err();
        assert!(matches!(
            err,
            LockboxError::NotFullyConfirmed {
                buyer: true,
                seller: false
            }
        ));
    }

    #[test]
    fn execute_is_buyer_only() {
        let (mut engine, buyer, seller) = initialized();
        let (_, address) = initiate(&mut engine, buyer, Decimal::ONE);
        engine.confirm_transaction(buyer, address).unwrap();
        engine.confirm_transaction(seller, address).unwrap();

        let err = engine.execute_transaction(seller, address).unwrap_err();
        assert!(matches!(err, LockboxError::Unauthorized { .. }));

        // Still live and fully confirmed afterwards.
        let txn = engine.transaction(&address).unwrap();
        assert!(txn.verifications.is_complete());
    }

    #[test]
    fn execute_unknown_address_fails() {
        let (mut engine, buyer, _) = initialized();
        let (address, _) = engine.transaction_address(TxnId(3)).unwrap();
        let err = engine.execute_transaction(buyer, address).unwrap_err();
        assert!(matches!(err, LockboxError::TransactionNotFound(_)));
    }

    #[test]
    fn every_operation_appends_one_receipt() {
        let (mut engine, buyer, seller) = initialized();
        assert_eq!(engine.receipts().len(), 1);

        let (_, address) = initiate(&mut engine, buyer, Decimal::ONE);
        engine.confirm_transaction(buyer, address).unwrap();
        engine.confirm_transaction(seller, address).unwrap();
        engine.execute_transaction(buyer, address).unwrap();

        let kinds: Vec<_> = engine.receipts().iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ReceiptKind::VaultInitialized,
                ReceiptKind::TransactionInitiated,
                ReceiptKind::TransactionConfirmed,
                ReceiptKind::TransactionConfirmed,
                ReceiptKind::TransactionExecuted,
            ]
        );
    }

    #[test]
    fn failed_operations_append_no_receipt() {
        let (mut engine, buyer, _) = initialized();
        let receipts_before = engine.receipts().len();
        let (address, bump) = engine.next_transaction_address().unwrap();
        let _ = engine.initiate_transaction(buyer, Decimal::ZERO, address, bump);
        let _ = engine.confirm_transaction(PartyId::generate(), address);
        assert_eq!(engine.receipts().len(), receipts_before);
    }
}
