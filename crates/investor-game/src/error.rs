//! Error types for the game ledger.
//!
//! Every [`GameError`] rejects the operation that raised it: the game
//! restores its own state and both collaborators before returning, so a
//! failed call has no observable effect.

use investor_ledger::LedgerError;
use investor_types::{Address, Amount};

/// Errors returned by [`GameLedger`](crate::GameLedger) operations.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// The caller has already joined.
    #[error("Already joined the game ({player})")]
    AlreadyRegistered {
        /// The caller.
        player: Address,
    },

    /// The caller has not joined.
    #[error("Must join game first ({player})")]
    NotRegistered {
        /// The caller.
        player: Address,
    },

    /// Purchases must be for at least one unit.
    #[error("quantity must be greater than zero")]
    InvalidQuantity,

    /// The property type tag is unknown, or the type is not in the catalog.
    #[error("unknown property type (tag {tag})")]
    UnknownPropertyType {
        /// The wire tag that failed to resolve.
        tag: u8,
    },

    /// The caller's balance or allowance does not cover the purchase.
    #[error("payment of {cost} failed: {source}")]
    PaymentFailed {
        /// The total price of the purchase.
        cost: Amount,
        /// The currency ledger's reason.
        source: LedgerError,
    },

    /// A cost, reward, or counter computation would overflow.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// What was being computed.
        context: &'static str,
    },

    /// The game's own balance cannot cover a grant or a claim.
    #[error("treasury cannot pay {amount}: {source}")]
    TreasuryDepleted {
        /// The amount the game tried to pay.
        amount: Amount,
        /// The currency ledger's reason.
        source: LedgerError,
    },

    /// The credential ledger refused to mint.
    #[error("credential issue failed: {source}")]
    CredentialIssue {
        /// The credential ledger's reason.
        source: LedgerError,
    },

    /// A collaborator could not be rolled back after a failure.
    ///
    /// State may be inconsistent after this error.
    #[error("rollback of {operation} failed: {source}")]
    Rollback {
        /// The operation being rolled back.
        operation: &'static str,
        /// The collaborator's reason.
        source: LedgerError,
    },
}

impl GameError {
    /// Shorthand for [`GameError::ArithmeticOverflow`].
    pub const fn overflow(context: &'static str) -> Self {
        Self::ArithmeticOverflow { context }
    }
}
