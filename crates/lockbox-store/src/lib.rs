//! # lockbox-store
//!
//! **Key-addressed record store**: the durable state surface of the
//! escrow engine. Vault and transaction records live in a single key
//! space keyed by their derived [`StoreAddress`] — callers locate
//! records purely by recomputing addresses; no other index exists.
//!
//! Creation is collision-checked: when two initiations race for the same
//! counter-derived address, exactly one `create` wins and the loser
//! observes [`LockboxError::AddressCollision`].
//!
//! [`StoreAddress`]: lockbox_types::StoreAddress
//! [`LockboxError::AddressCollision`]: lockbox_types::LockboxError::AddressCollision

pub mod record;
pub mod store;

pub use record::Record;
pub use store::RecordStore;
