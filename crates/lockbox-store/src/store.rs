//! The key-addressed record store.
//!
//! A single `StoreAddress → Record` map. All mutations are atomic at the
//! record level: `create` either installs the record or fails with the
//! store unchanged, and `close` removes exactly one record.

use std::collections::HashMap;

use lockbox_types::{LockboxError, Result, StoreAddress};

use crate::record::Record;

/// Key-addressed storage for vault and transaction records.
///
/// The store itself enforces no escrow semantics — the engine is the
/// only component permitted to mutate records, and it performs all
/// authorization and sequencing checks before touching the store.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: HashMap<StoreAddress, Record>,
}

impl RecordStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
        }
    }

    /// Install a record at an unoccupied address.
    ///
    /// # Errors
    /// Returns [`LockboxError::AddressCollision`] if the address is
    /// occupied; the existing record is left intact. Racing creations
    /// for one derived address thus have exactly one winner.
    pub fn create(&mut self, address: StoreAddress, record: Record) -> Result<()> {
        if self.records.contains_key(&address) {
            return Err(LockboxError::AddressCollision(address));
        }
        self.records.insert(address, record);
        Ok(())
    }

    /// Fetch the record at an address.
    #[must_use]
    pub fn get(&self, address: &StoreAddress) -> Option<&Record> {
        self.records.get(address)
    }

    /// Fetch the record at an address for mutation.
    #[must_use]
    pub fn get_mut(&mut self, address: &StoreAddress) -> Option<&mut Record> {
        self.records.get_mut(address)
    }

    /// Whether any record exists at the address.
    #[must_use]
    pub fn contains(&self, address: &StoreAddress) -> bool {
        self.records.contains_key(address)
    }

    /// Remove and return the record at an address (storage reclaim).
    pub fn close(&mut self, address: &StoreAddress) -> Option<Record> {
        self.records.remove(address)
    }

    /// Number of live records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
