//! # lockbox-types
//!
//! Shared types, errors, and configuration for the **Lockbox** two-party
//! escrow engine.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`PartyId`], [`TxnId`], [`ReceiptId`]
//! - **Addressing**: [`StoreAddress`] and the deterministic derivation
//!   functions that locate every record without a directory
//! - **Vault model**: [`Vault`], [`PartyRole`]
//! - **Transaction model**: [`Transaction`], [`Verifications`], [`TransactionState`]
//! - **Receipt model**: [`Receipt`], [`ReceiptKind`]
//! - **Configuration**: [`EngineConfig`]
//! - **Errors**: [`LockboxError`] with `LBX_ERR_` prefix codes
//! - **Constants**: protocol seed and system-wide defaults

pub mod address;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod receipt;
pub mod transaction;
pub mod vault;

// Re-export all primary types at crate root for ergonomic imports:
//   use lockbox_types::{Vault, Transaction, PartyId, StoreAddress, ...};

pub use address::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use receipt::*;
pub use transaction::*;
pub use vault::*;

// Constants are accessed via `lockbox_types::constants::FOO`
// (not re-exported to avoid name collisions).
