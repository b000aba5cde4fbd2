//! Currency and credential ledgers consumed by the Idle Investor game.
//!
//! The game ledger never stores money or credentials itself. It calls out
//! to two collaborators through the traits defined here:
//!
//! - [`CurrencyLedger`] -- a fixed-supply fungible token with balances,
//!   transfers, and allowances.
//! - [`CredentialLedger`] -- a non-fungible registry whose administrator
//!   (the owner) is the only party allowed to mint.
//!
//! Both ship with an in-memory implementation ([`TokenLedger`] and
//! [`CredentialRegistry`]) and both implement [`Revertible`], which lets
//! the caller roll a whole multi-call operation back to a checkpoint.
//!
//! # Modules
//!
//! - [`currency`] -- [`CurrencyLedger`] trait and the journaled [`TokenLedger`].
//! - [`credential`] -- [`CredentialLedger`] trait and [`CredentialRegistry`].
//! - [`transaction`] -- [`TransactionBuilder`] for validated journal entries.
//! - [`conservation`] -- Supply conservation verification.
//!
//! # Conservation Law
//!
//! The supply is minted once, at genesis. After that, for every holder H:
//!
//! ```text
//! balance(H) == replay(journal, H)
//! sum(balance(H) for all H) == total_supply
//! ```
//!
//! A violation produces a [`LedgerAnomaly`].
//!
//! # Usage
//!
//! ```
//! use investor_ledger::{CurrencyLedger, TokenLedger, CurrencyMetadata, ConservationResult};
//! use investor_types::Address;
//!
//! let deployer = Address::new();
//! let player = Address::new();
//! let metadata = CurrencyMetadata::new("Investor Token", "INV", 0);
//!
//! let mut ledger = TokenLedger::with_genesis(metadata, deployer, 1_000)?;
//! ledger.transfer(deployer, player, 100)?;
//! assert_eq!(ledger.balance_of(player), 100);
//! assert_eq!(ledger.verify_conservation(), ConservationResult::Balanced);
//! # Ok::<(), investor_ledger::LedgerError>(())
//! ```

pub mod conservation;
pub mod credential;
pub mod currency;
pub mod transaction;

// Re-export primary types at crate root.
pub use conservation::ConservationResult;
pub use credential::{CredentialLedger, CredentialMetadata, CredentialRegistry, MintCheckpoint};
pub use currency::{CurrencyLedger, CurrencyMetadata, JournalCheckpoint, TokenLedger};
pub use transaction::TransactionBuilder;

use std::collections::BTreeMap;

use investor_types::{Address, Amount, LedgerEntryType, TokenId};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors returned by the currency and credential ledgers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// Amounts must be strictly positive.
    #[error("ledger amount must be non-zero")]
    ZeroAmount,

    /// The debited holder does not have enough funds.
    #[error("insufficient balance for {holder}: required {required}, available {available}")]
    InsufficientBalance {
        /// The holder being debited.
        holder: Address,
        /// The amount requested.
        required: Amount,
        /// The holder's balance.
        available: Amount,
    },

    /// The spender has not been approved for enough of the owner's funds.
    #[error(
        "insufficient allowance for spender {spender} on {owner}: required {required}, approved {approved}"
    )]
    InsufficientAllowance {
        /// The holder whose funds are being spent.
        owner: Address,
        /// The party spending them.
        spender: Address,
        /// The amount requested.
        required: Amount,
        /// The remaining approved amount.
        approved: Amount,
    },

    /// An administrative action was attempted by someone other than the owner.
    #[error("{caller} is not the registry owner ({owner})")]
    NotOwner {
        /// Who attempted the action.
        caller: Address,
        /// The current owner.
        owner: Address,
    },

    /// The credential token does not exist.
    #[error("unknown credential token {0}")]
    UnknownToken(TokenId),

    /// A required field was not set on the builder.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The entry's parties do not match the contract for its type.
    #[error("invalid {entry_type:?} entry: {reason}")]
    InvalidEntry {
        /// The entry type being validated.
        entry_type: LedgerEntryType,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// A balance, allowance, or counter would overflow.
    #[error("arithmetic overflow: {context}")]
    Overflow {
        /// What was being computed.
        context: &'static str,
    },

    /// A checkpoint lies beyond the current journal position.
    #[error("unknown checkpoint {checkpoint} (current position {current})")]
    UnknownCheckpoint {
        /// The requested checkpoint position.
        checkpoint: u64,
        /// The current position.
        current: u64,
    },

    /// An internal error that should not occur in normal operation.
    #[error("internal ledger error: {0}")]
    InternalError(&'static str),
}

// ---------------------------------------------------------------------------
// Rollback
// ---------------------------------------------------------------------------

/// A ledger that can be rolled back to an earlier state.
///
/// This stands in for the all-or-nothing transaction semantics of a host
/// execution environment: a caller composing several ledger calls takes a
/// checkpoint first and reverts to it if any later step fails.
pub trait Revertible {
    /// Opaque marker of a ledger state.
    type Checkpoint: Copy + core::fmt::Debug;

    /// Capture the current state.
    fn checkpoint(&self) -> Self::Checkpoint;

    /// Undo every change made since `checkpoint` was taken.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownCheckpoint`] if the checkpoint is ahead
    /// of the current state, or [`LedgerError::InternalError`] if the undo
    /// cannot be applied.
    fn revert_to(&mut self, checkpoint: Self::Checkpoint) -> Result<(), LedgerError>;
}

// ---------------------------------------------------------------------------
// Anomaly type
// ---------------------------------------------------------------------------

/// A conservation law violation found by [`conservation::verify_conservation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerAnomaly {
    /// Per-holder mismatch: (`replayed_balance`, `recorded_balance`).
    pub imbalances: BTreeMap<Address, (Amount, Amount)>,
    /// Declared total supply.
    pub total_supply: Amount,
    /// Human-readable description of the anomaly.
    pub message: String,
}

impl core::fmt::Display for LedgerAnomaly {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)
    }
}
