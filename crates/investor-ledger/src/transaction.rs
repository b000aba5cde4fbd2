//! Transaction builders and validation for the currency journal.
//!
//! Provides a [`TransactionBuilder`] that enforces the shape of every
//! journal entry: genesis has no debited holder, a transfer debits its
//! sender, and a delegated transfer also names the spender whose allowance
//! paid for it. Builders validate inputs before producing a [`LedgerEntry`].

use chrono::Utc;

use investor_types::{Address, Amount, LedgerEntry, LedgerEntryId, LedgerEntryType};

use crate::LedgerError;

// ---------------------------------------------------------------------------
// Transaction builder
// ---------------------------------------------------------------------------

/// Builder for constructing validated [`LedgerEntry`] values.
///
/// # Examples
///
/// ```
/// use investor_ledger::TransactionBuilder;
/// use investor_types::{Address, LedgerEntryType};
///
/// let entry = TransactionBuilder::new(1, LedgerEntryType::Transfer)
///     .from(Address::new())
///     .to(Address::new())
///     .amount(5)
///     .build();
///
/// assert!(entry.is_ok());
/// ```
#[derive(Debug)]
pub struct TransactionBuilder {
    sequence: u64,
    entry_type: LedgerEntryType,
    from: Option<Address>,
    to: Option<Address>,
    spender: Option<Address>,
    amount: Option<Amount>,
}

impl TransactionBuilder {
    /// Start building the entry at journal position `sequence`.
    pub const fn new(sequence: u64, entry_type: LedgerEntryType) -> Self {
        Self {
            sequence,
            entry_type,
            from: None,
            to: None,
            spender: None,
            amount: None,
        }
    }

    /// Set the debited holder.
    #[must_use]
    pub const fn from(mut self, holder: Address) -> Self {
        self.from = Some(holder);
        self
    }

    /// Set the credited holder.
    #[must_use]
    pub const fn to(mut self, holder: Address) -> Self {
        self.to = Some(holder);
        self
    }

    /// Set the spender whose allowance funds a delegated transfer.
    #[must_use]
    pub const fn spender(mut self, spender: Address) -> Self {
        self.spender = Some(spender);
        self
    }

    /// Set the amount moved.
    #[must_use]
    pub const fn amount(mut self, amount: Amount) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Validate inputs and produce a [`LedgerEntry`].
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::MissingField`] if the amount or recipient is
    /// not set, [`LedgerError::ZeroAmount`] for a zero amount, and
    /// [`LedgerError::InvalidEntry`] if the parties do not match the entry
    /// type.
    pub fn build(self) -> Result<LedgerEntry, LedgerError> {
        let amount = self.amount.ok_or(LedgerError::MissingField("amount"))?;
        let to = self.to.ok_or(LedgerError::MissingField("to"))?;

        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }

        validate_parties(self.entry_type, self.from.is_some(), self.spender.is_some())?;

        Ok(LedgerEntry {
            id: LedgerEntryId::new(),
            sequence: self.sequence,
            entry_type: self.entry_type,
            from: self.from,
            to,
            spender: self.spender,
            amount,
            created_at: Utc::now(),
        })
    }
}

/// Check that the optional parties match the contract for `entry_type`.
pub(crate) fn validate_parties(
    entry_type: LedgerEntryType,
    has_from: bool,
    has_spender: bool,
) -> Result<(), LedgerError> {
    let (expects_from, expects_spender) = expected_parties(entry_type);

    if has_from != expects_from {
        return Err(LedgerError::InvalidEntry {
            entry_type,
            reason: if expects_from {
                "a debited holder is required"
            } else {
                "genesis entries have no debited holder"
            },
        });
    }

    if has_spender != expects_spender {
        return Err(LedgerError::InvalidEntry {
            entry_type,
            reason: if expects_spender {
                "a spender is required"
            } else {
                "only delegated transfers name a spender"
            },
        });
    }

    Ok(())
}

/// Return whether (`from`, `spender`) are expected for each [`LedgerEntryType`].
const fn expected_parties(entry_type: LedgerEntryType) -> (bool, bool) {
    match entry_type {
        LedgerEntryType::Genesis => (false, false),
        LedgerEntryType::Transfer => (true, false),
        LedgerEntryType::DelegatedTransfer => (true, true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_produces_valid_entry() {
        let from = Address::new();
        let to = Address::new();
        let result = TransactionBuilder::new(3, LedgerEntryType::Transfer)
            .from(from)
            .to(to)
            .amount(5)
            .build();

        assert!(result.is_ok());
        if let Ok(entry) = result {
            assert_eq!(entry.sequence, 3);
            assert_eq!(entry.entry_type, LedgerEntryType::Transfer);
            assert_eq!(entry.from, Some(from));
            assert_eq!(entry.to, to);
            assert_eq!(entry.amount, 5);
        }
    }

    #[test]
    fn zero_amount_rejected() {
        let result = TransactionBuilder::new(1, LedgerEntryType::Transfer)
            .from(Address::new())
            .to(Address::new())
            .amount(0)
            .build();

        assert!(matches!(result, Err(LedgerError::ZeroAmount)));
    }

    #[test]
    fn missing_amount_rejected() {
        let result = TransactionBuilder::new(1, LedgerEntryType::Transfer)
            .from(Address::new())
            .to(Address::new())
            .build();

        assert!(matches!(result, Err(LedgerError::MissingField("amount"))));
    }

    #[test]
    fn genesis_with_sender_rejected() {
        let result = TransactionBuilder::new(0, LedgerEntryType::Genesis)
            .from(Address::new())
            .to(Address::new())
            .amount(10)
            .build();

        assert!(matches!(result, Err(LedgerError::InvalidEntry { .. })));
    }

    #[test]
    fn delegated_transfer_requires_spender() {
        let result = TransactionBuilder::new(1, LedgerEntryType::DelegatedTransfer)
            .from(Address::new())
            .to(Address::new())
            .amount(10)
            .build();

        assert!(matches!(result, Err(LedgerError::InvalidEntry { .. })));

        let with_spender = TransactionBuilder::new(1, LedgerEntryType::DelegatedTransfer)
            .from(Address::new())
            .to(Address::new())
            .spender(Address::new())
            .amount(10)
            .build();

        assert!(with_spender.is_ok());
    }

    #[test]
    fn plain_transfer_rejects_spender() {
        let result = TransactionBuilder::new(1, LedgerEntryType::Transfer)
            .from(Address::new())
            .to(Address::new())
            .spender(Address::new())
            .amount(10)
            .build();

        assert!(matches!(result, Err(LedgerError::InvalidEntry { .. })));
    }
}
