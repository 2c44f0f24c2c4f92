//! System-wide constants for the Lockbox escrow engine.

/// Fixed protocol seed shared by every derived address in a deployment.
/// The vault's address is derived from this seed alone; transaction
/// addresses prepend the little-endian transaction id.
pub const VAULT_SEED: &[u8] = b"1011";

/// Number of confirmation slots on a transaction (buyer + seller).
pub const CONFIRMATION_SLOTS: usize = 2;

/// Settled-address cache size (number of closed transaction addresses
/// to remember for `AlreadySettled` answers).
pub const SETTLED_CACHE_SIZE: usize = 500_000;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "Lockbox";
