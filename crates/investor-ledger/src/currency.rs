//! The fungible currency ledger.
//!
//! [`TokenLedger`] is a fixed-supply token: the whole supply is minted to a
//! single holder at genesis and only ever moves afterwards. Every movement
//! is appended to a journal of [`LedgerEntry`] values, which is what makes
//! both conservation checks and rollback possible.
//!
//! # Design
//!
//! - **Fixed supply**: there is no mint or burn after genesis.
//! - **Journaled**: balances are a cache of the journal replay.
//! - **Revertible**: a [`JournalCheckpoint`] is a journal length; reverting
//!   pops and inverts entries, restoring consumed allowance too.
//! - **Approvals are not journaled**: reverting restores allowance consumed
//!   by delegated transfers but does not undo `approve` calls.

use std::collections::BTreeMap;

use tracing::debug;

use investor_types::{Address, Amount, LedgerEntry, LedgerEntryType};

use crate::conservation::{ConservationResult, verify_conservation, verify_conservation_strict};
use crate::{LedgerError, Revertible, TransactionBuilder};

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A fungible balance store with transfer and allowance semantics.
///
/// The caller identity that a host environment would supply implicitly is
/// an explicit parameter here (`from`, `owner`, `spender`).
pub trait CurrencyLedger {
    /// Balance held by `holder`.
    fn balance_of(&self, holder: Address) -> Amount;

    /// The fixed total supply.
    fn total_supply(&self) -> Amount;

    /// Remaining amount `spender` may move out of `owner`'s balance.
    fn allowance(&self, owner: Address, spender: Address) -> Amount;

    /// Set the amount `spender` may move out of `owner`'s balance.
    ///
    /// # Errors
    ///
    /// Implementations may reject approvals they cannot record.
    fn approve(
        &mut self,
        owner: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<(), LedgerError>;

    /// Move `amount` from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ZeroAmount`] for a zero amount and
    /// [`LedgerError::InsufficientBalance`] if `from` cannot cover it.
    fn transfer(&mut self, from: Address, to: Address, amount: Amount) -> Result<(), LedgerError>;

    /// Move `amount` from `from` to `to` on behalf of `spender`, consuming
    /// allowance previously granted by `from`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InsufficientAllowance`] if the approval does
    /// not cover the amount and [`LedgerError::InsufficientBalance`] if the
    /// balance does not.
    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), LedgerError>;

    /// Check that balances reconcile with the total supply.
    fn verify_conservation(&self) -> ConservationResult;
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// Descriptive token metadata.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CurrencyMetadata {
    /// Display name.
    pub name: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Number of base-unit decimals in one whole token.
    pub decimals: u32,
}

impl CurrencyMetadata {
    /// Build metadata from borrowed strings.
    pub fn new(name: &str, symbol: &str, decimals: u32) -> Self {
        Self {
            name: name.to_owned(),
            symbol: symbol.to_owned(),
            decimals,
        }
    }
}

// ---------------------------------------------------------------------------
// Token ledger
// ---------------------------------------------------------------------------

/// A journal position that [`TokenLedger`] can revert to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JournalCheckpoint(pub usize);

/// In-memory fixed-supply currency ledger.
#[derive(Debug, Clone)]
pub struct TokenLedger {
    metadata: CurrencyMetadata,
    total_supply: Amount,
    balances: BTreeMap<Address, Amount>,
    allowances: BTreeMap<(Address, Address), Amount>,
    entries: Vec<LedgerEntry>,
}

impl TokenLedger {
    /// Create a ledger and mint the entire `supply` to `holder`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ZeroAmount`] if `supply` is zero.
    pub fn with_genesis(
        metadata: CurrencyMetadata,
        holder: Address,
        supply: Amount,
    ) -> Result<Self, LedgerError> {
        let genesis = TransactionBuilder::new(0, LedgerEntryType::Genesis)
            .to(holder)
            .amount(supply)
            .build()?;

        let mut balances = BTreeMap::new();
        balances.insert(holder, supply);

        debug!(
            symbol = metadata.symbol,
            holder = %holder,
            supply,
            "currency genesis minted"
        );

        Ok(Self {
            metadata,
            total_supply: supply,
            balances,
            allowances: BTreeMap::new(),
            entries: vec![genesis],
        })
    }

    /// Token metadata.
    pub const fn metadata(&self) -> &CurrencyMetadata {
        &self.metadata
    }

    /// All journal entries, in order.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Journal entries that debit or credit `holder`.
    pub fn entries_for(&self, holder: Address) -> Vec<&LedgerEntry> {
        self.entries
            .iter()
            .filter(|e| e.to == holder || e.from == Some(holder))
            .collect()
    }

    /// Every holder with its recorded balance.
    pub fn holders(&self) -> impl Iterator<Item = (Address, Amount)> + '_ {
        self.balances.iter().map(|(holder, amount)| (*holder, *amount))
    }

    /// [`CurrencyLedger::verify_conservation`] plus journal shape checks
    /// (contiguous sequence numbers, a single leading genesis entry).
    pub fn verify_conservation_strict(&self) -> ConservationResult {
        verify_conservation_strict(self.total_supply, &self.balances, &self.entries)
    }

    fn next_sequence(&self) -> Result<u64, LedgerError> {
        u64::try_from(self.entries.len())
            .map_err(|_err| LedgerError::Overflow {
                context: "journal length exceeds u64",
            })
    }

    /// Validate, apply, and journal a movement between two holders.
    fn record_movement(
        &mut self,
        entry_type: LedgerEntryType,
        spender: Option<Address>,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let mut builder = TransactionBuilder::new(self.next_sequence()?, entry_type)
            .from(from)
            .to(to)
            .amount(amount);
        if let Some(spender) = spender {
            builder = builder.spender(spender);
        }
        let entry = builder.build()?;

        let available = self.balance_of(from);
        let debited = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                holder: from,
                required: amount,
                available,
            })?;

        let remaining_allowance = match spender {
            Some(spender) => {
                let approved = self.allowance(from, spender);
                let remaining =
                    approved
                        .checked_sub(amount)
                        .ok_or(LedgerError::InsufficientAllowance {
                            owner: from,
                            spender,
                            required: amount,
                            approved,
                        })?;
                Some((spender, remaining))
            }
            None => None,
        };

        let credited = if from == to {
            available
        } else {
            self.balance_of(to)
                .checked_add(amount)
                .ok_or(LedgerError::Overflow {
                    context: "recipient balance",
                })?
        };

        // All checks are done; nothing below can fail.
        self.balances.insert(from, debited);
        self.balances.insert(to, credited);

        if let Some((spender, remaining)) = remaining_allowance {
            self.allowances.insert((from, spender), remaining);
        }

        debug!(
            entry_type = ?entry_type,
            from = %from,
            to = %to,
            amount,
            "currency moved"
        );
        self.entries.push(entry);
        Ok(())
    }

    /// Invert one journal entry during rollback.
    fn undo(&mut self, entry: &LedgerEntry) -> Result<(), LedgerError> {
        let credited = self
            .balance_of(entry.to)
            .checked_sub(entry.amount)
            .ok_or(LedgerError::InternalError("rollback underflows recipient"))?;
        self.balances.insert(entry.to, credited);

        match entry.from {
            Some(from) => {
                let restored = self
                    .balance_of(from)
                    .checked_add(entry.amount)
                    .ok_or(LedgerError::InternalError("rollback overflows sender"))?;
                self.balances.insert(from, restored);
            }
            None => {
                self.total_supply = self
                    .total_supply
                    .checked_sub(entry.amount)
                    .ok_or(LedgerError::InternalError("rollback underflows supply"))?;
            }
        }

        if let (Some(from), Some(spender)) = (entry.from, entry.spender) {
            let restored = self
                .allowance(from, spender)
                .checked_add(entry.amount)
                .ok_or(LedgerError::InternalError("rollback overflows allowance"))?;
            self.allowances.insert((from, spender), restored);
        }

        Ok(())
    }
}

impl CurrencyLedger for TokenLedger {
    fn balance_of(&self, holder: Address) -> Amount {
        self.balances.get(&holder).copied().unwrap_or(0)
    }

    fn total_supply(&self) -> Amount {
        self.total_supply
    }

    fn allowance(&self, owner: Address, spender: Address) -> Amount {
        self.allowances.get(&(owner, spender)).copied().unwrap_or(0)
    }

    fn approve(
        &mut self,
        owner: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        self.allowances.insert((owner, spender), amount);
        debug!(owner = %owner, spender = %spender, amount, "allowance approved");
        Ok(())
    }

    fn transfer(&mut self, from: Address, to: Address, amount: Amount) -> Result<(), LedgerError> {
        self.record_movement(LedgerEntryType::Transfer, None, from, to, amount)
    }

    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        self.record_movement(
            LedgerEntryType::DelegatedTransfer,
            Some(spender),
            from,
            to,
            amount,
        )
    }

    /// Replays the journal and compares it with the recorded balances.
    fn verify_conservation(&self) -> ConservationResult {
        verify_conservation(self.total_supply, &self.balances, &self.entries)
    }
}

impl Revertible for TokenLedger {
    type Checkpoint = JournalCheckpoint;

    fn checkpoint(&self) -> JournalCheckpoint {
        JournalCheckpoint(self.entries.len())
    }

    fn revert_to(&mut self, checkpoint: JournalCheckpoint) -> Result<(), LedgerError> {
        if checkpoint.0 > self.entries.len() {
            return Err(LedgerError::UnknownCheckpoint {
                checkpoint: u64::try_from(checkpoint.0).unwrap_or(u64::MAX),
                current: u64::try_from(self.entries.len()).unwrap_or(u64::MAX),
            });
        }

        while self.entries.len() > checkpoint.0 {
            let Some(entry) = self.entries.pop() else {
                break;
            };
            self.undo(&entry)?;
        }

        debug!(position = checkpoint.0, "currency journal reverted");
        Ok(())
    }
}
