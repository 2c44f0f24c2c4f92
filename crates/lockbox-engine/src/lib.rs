//! # lockbox-engine
//!
//! **The escrow state machine**: the four operations that mutate vault
//! and transaction state under authorization and sequencing rules.
//!
//! ## Architecture
//!
//! 1. **Ledger**: per-party wallets plus per-address custody holdings
//! 2. **SettledGuard**: remembers closed transaction addresses so
//!    repeated execution answers `AlreadySettled`
//! 3. **EscrowEngine**: the only component permitted to mutate stored
//!    state — initialize, initiate, confirm, execute, plus read queries
//!
//! ## Operation Flow
//!
//! ```text
//! initialize → initiate_transaction → confirm_transaction (buyer)
//!            ↘ confirm_transaction (seller, either order)
//!            → execute_transaction → custody released to seller
//! ```
//!
//! Every operation is all-or-nothing: preconditions are checked before
//! the first write, so a failing call leaves all state untouched.

pub mod engine;
pub mod ledger;
pub mod settled;

pub use engine::EscrowEngine;
pub use ledger::Ledger;
pub use settled::SettledGuard;
