//! Settled-transaction guard — terminal-state memory.
//!
//! Execution closes a transaction's record to reclaim its storage, so
//! the record itself can no longer answer for its own history. The
//! guard remembers closed addresses: any later confirm or execute
//! against one returns [`LockboxError::AlreadySettled`].
//!
//! The guard maintains an LRU-style bounded cache so memory usage stays
//! predictable in long-running deployments.

use std::collections::{HashSet, VecDeque};

use lockbox_types::{LockboxError, Result, StoreAddress};

/// Remembers which transaction addresses have reached the terminal
/// settled state.
///
/// Internally stores a bounded set with LRU eviction: when the set
/// reaches `max_size`, the oldest entry is evicted to make room.
#[derive(Debug)]
pub struct SettledGuard {
    /// Addresses of transactions that have been executed and closed.
    settled: HashSet<StoreAddress>,
    /// Insertion order for LRU eviction (front = oldest).
    order: VecDeque<StoreAddress>,
    /// Maximum number of entries before eviction kicks in.
    max_size: usize,
}

impl SettledGuard {
    /// Create a new guard with the given maximum cache size.
    ///
    /// # Panics
    /// Panics if `max_size` is zero.
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        assert!(max_size > 0, "SettledGuard max_size must be > 0");
        Self {
            settled: HashSet::new(),
            order: VecDeque::new(),
            max_size,
        }
    }

    /// Mark an address as settled.
    ///
    /// # Errors
    /// Returns [`LockboxError::AlreadySettled`] if the address was
    /// already marked.
    pub fn mark_settled(&mut self, address: StoreAddress) -> Result<()> {
        if self.settled.contains(&address) {
            return Err(LockboxError::AlreadySettled(address));
        }

        // Evict oldest if at capacity.
        if self.settled.len() >= self.max_size {
            if let Some(oldest) = self.order.pop_front() {
                self.settled.remove(&oldest);
            }
        }

        self.settled.insert(address);
        self.order.push_back(address);
        Ok(())
    }

    /// Whether an address has been settled.
    #[must_use]
    pub fn is_settled(&self, address: &StoreAddress) -> bool {
        self.settled.contains(address)
    }

    /// Number of settled addresses currently remembered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.settled.len()
    }

    /// Whether the guard remembers nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.settled.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(byte: u8) -> StoreAddress {
        StoreAddress([byte; 32])
    }

    #[test]
    fn first_settle_ok() {
        let mut guard = SettledGuard::new(100);
        assert!(guard.mark_settled(address(1)).is_ok());
        assert!(guard.is_settled(&address(1)));
        assert_eq!(guard.len(), 1);
    }

    #[test]
    fn double_settle_blocked() {
        let mut guard = SettledGuard::new(100);
        guard.mark_settled(address(1)).unwrap();

        let err = guard.mark_settled(address(1)).unwrap_err();
        assert!(
            matches!(err, LockboxError::AlreadySettled(a) if a == address(1)),
            "Expected AlreadySettled, got: {err:?}"
        );
    }

    #[test]
    fn evicts_oldest() {
        let mut guard = SettledGuard::new(3);
        guard.mark_settled(address(1)).unwrap();
        guard.mark_settled(address(2)).unwrap();
        guard.mark_settled(address(3)).unwrap();
        assert_eq!(guard.len(), 3);

        // Adding a fourth evicts the oldest.
        guard.mark_settled(address(4)).unwrap();
        assert_eq!(guard.len(), 3);
        assert!(!guard.is_settled(&address(1)), "oldest should be evicted");
        assert!(guard.is_settled(&address(2)));
        assert!(guard.is_settled(&address(4)));
    }

    #[test]
    fn empty_guard() {
        let guard = SettledGuard::new(10);
        assert!(guard.is_empty());
        assert_eq!(guard.len(), 0);
        assert!(!guard.is_settled(&address(1)));
    }

    #[test]
    #[should_panic(expected = "max_size must be > 0")]
    fn zero_max_size_panics() {
        let _ = SettledGuard::new(0);
    }
}
