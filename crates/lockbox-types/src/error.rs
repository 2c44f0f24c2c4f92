//! Error types for the Lockbox escrow engine.
//!
//! All errors use the `LBX_ERR_` prefix convention for easy grepping in
//! logs. Error codes are grouped by subsystem:
//! - 1xx: Addressing errors
//! - 2xx: Vault errors
//! - 3xx: Transaction errors
//! - 4xx: Authorization errors
//! - 5xx: Settlement errors
//! - 6xx: Funds errors
//!
//! Every error is returned synchronously to the caller of the failing
//! operation; no operation is retried by the engine, and a failing call
//! leaves all records and balances exactly as they were.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{PartyId, StoreAddress};

/// Central error enum for all Lockbox operations.
#[derive(Debug, Error)]
pub enum LockboxError {
    // =================================================================
    // Addressing Errors (1xx)
    // =================================================================
    /// No bump in the bounded search space produced a valid address.
    /// Fatal configuration error; not expected in normal operation.
    #[error("LBX_ERR_100: Address derivation failed: no valid bump in 0..=255")]
    AddressDerivation,

    /// The client supplied a stale or incorrect derived address or bump.
    /// Callers must re-read the counter and re-derive before retrying.
    #[error("LBX_ERR_101: Address mismatch: {reason}")]
    AddressMismatch { reason: String },

    // =================================================================
    // Vault Errors (2xx)
    // =================================================================
    /// The vault address is already occupied. Initialization is one-time.
    #[error("LBX_ERR_200: Vault already initialized at {0}")]
    AlreadyInitialized(StoreAddress),

    /// No vault exists yet. No other operation may run before
    /// initialization succeeds.
    #[error("LBX_ERR_201: Vault not found")]
    VaultNotFound,

    // =================================================================
    // Transaction Errors (3xx)
    // =================================================================
    /// The escrowed amount must be strictly positive.
    #[error("LBX_ERR_300: Invalid amount: {amount} (must be positive)")]
    InvalidAmount { amount: Decimal },

    /// No transaction record exists at the given address.
    #[error("LBX_ERR_301: Transaction not found at {0}")]
    TransactionNotFound(StoreAddress),

    /// A record already exists at the derived address — the race for
    /// this counter value was lost.
    #[error("LBX_ERR_302: Address collision: record already exists at {0}")]
    AddressCollision(StoreAddress),

    // =================================================================
    // Authorization Errors (4xx)
    // =================================================================
    /// The caller is not permitted to perform the attempted operation.
    #[error("LBX_ERR_400: Unauthorized: {party} may not {operation}")]
    Unauthorized { party: PartyId, operation: String },

    // =================================================================
    // Settlement Errors (5xx)
    // =================================================================
    /// Execution requires both verification slots to be true.
    #[error("LBX_ERR_500: Not fully confirmed: buyer={buyer}, seller={seller}")]
    NotFullyConfirmed { buyer: bool, seller: bool },

    /// The transaction has already been executed and closed.
    #[error("LBX_ERR_501: Transaction already settled at {0}")]
    AlreadySettled(StoreAddress),

    // =================================================================
    // Funds Errors (6xx)
    // =================================================================
    /// Not enough available balance to fund the operation.
    #[error("LBX_ERR_600: Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Decimal, available: Decimal },

    /// A custody release would exceed the holdings at an address.
    #[error("LBX_ERR_601: Custody underflow at {0}")]
    CustodyUnderflow(StoreAddress),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, LockboxError>;
