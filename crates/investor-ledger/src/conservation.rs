//! Conservation law verification for the currency ledger.
//!
//! The supply is created exactly once, by the genesis entry, and is never
//! destroyed. Every later entry debits one holder and credits another by
//! the same amount. Two checks follow:
//!
//! ```text
//! sum(recorded balances) == total_supply
//! replay(journal)[H] == recorded balance[H]   for every holder H
//! ```
//!
//! Recorded balances are derived from the same journal, so both checks
//! pass by construction for a well-behaved ledger. They exist to catch
//! corruption and bugs in any future ledger implementation.
//!
//! A violation produces a [`LedgerAnomaly`].

use std::collections::{BTreeMap, BTreeSet};

use investor_types::{Address, Amount, LedgerEntry, LedgerEntryType};

use crate::LedgerAnomaly;
use crate::transaction::validate_parties;

/// The result of a conservation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConservationResult {
    /// Balances match the journal and the supply.
    Balanced,
    /// One or more holders, or the supply total, do not reconcile.
    Anomaly(LedgerAnomaly),
}

impl ConservationResult {
    /// Whether the check passed.
    pub const fn is_balanced(&self) -> bool {
        matches!(self, Self::Balanced)
    }
}

/// Verify recorded balances against a journal replay and the total supply.
pub fn verify_conservation(
    total_supply: Amount,
    balances: &BTreeMap<Address, Amount>,
    entries: &[LedgerEntry],
) -> ConservationResult {
    let mut replayed: BTreeMap<Address, Amount> = BTreeMap::new();
    let mut minted: Amount = 0;

    for entry in entries {
        if let Some(from) = entry.from {
            let debit = replayed.entry(from).or_insert(0);
            *debit = match debit.checked_sub(entry.amount) {
                Some(val) => val,
                None => {
                    return anomaly(
                        total_supply,
                        BTreeMap::new(),
                        format!(
                            "LEDGER_ANOMALY: entry {} overdraws {from} during replay",
                            entry.sequence
                        ),
                    );
                }
            };
        } else {
            minted = match minted.checked_add(entry.amount) {
                Some(val) => val,
                None => return overflow_anomaly(total_supply, "minted total"),
            };
        }

        let credit = replayed.entry(entry.to).or_insert(0);
        *credit = match credit.checked_add(entry.amount) {
            Some(val) => val,
            None => return overflow_anomaly(total_supply, "replayed balance"),
        };
    }

    if minted != total_supply {
        return anomaly(
            total_supply,
            BTreeMap::new(),
            format!("LEDGER_ANOMALY: journal minted {minted} but declared supply is {total_supply}"),
        );
    }

    let mut circulating: Amount = 0;
    for amount in balances.values() {
        circulating = match circulating.checked_add(*amount) {
            Some(val) => val,
            None => return overflow_anomaly(total_supply, "circulating total"),
        };
    }

    // Collect every holder seen in either the replay or the balance table.
    let all_holders: BTreeSet<Address> = replayed.keys().chain(balances.keys()).copied().collect();

    let mut imbalances: BTreeMap<Address, (Amount, Amount)> = BTreeMap::new();
    for holder in &all_holders {
        let expected = replayed.get(holder).copied().unwrap_or(0);
        let recorded = balances.get(holder).copied().unwrap_or(0);
        if expected != recorded {
            imbalances.insert(*holder, (expected, recorded));
        }
    }

    if imbalances.is_empty() && circulating == total_supply {
        ConservationResult::Balanced
    } else {
        let count = imbalances.len();
        anomaly(
            total_supply,
            imbalances,
            format!(
                "LEDGER_ANOMALY: {count} holder(s) diverge from the journal, circulating {circulating} vs supply {total_supply}",
            ),
        )
    }
}

/// Verify conservation with additional journal shape checks.
///
/// Runs [`verify_conservation`] and then checks that sequence numbers are
/// contiguous from zero, that genesis appears exactly once at position
/// zero, and that every entry names the parties its type requires.
pub fn verify_conservation_strict(
    total_supply: Amount,
    balances: &BTreeMap<Address, Amount>,
    entries: &[LedgerEntry],
) -> ConservationResult {
    let result = verify_conservation(total_supply, balances, entries);
    if let ConservationResult::Anomaly(_) = &result {
        return result;
    }

    for (position, entry) in entries.iter().enumerate() {
        let expected_sequence = u64::try_from(position).unwrap_or(u64::MAX);
        if entry.sequence != expected_sequence {
            return anomaly(
                total_supply,
                BTreeMap::new(),
                format!(
                    "LEDGER_ANOMALY: entry at position {position} carries sequence {}",
                    entry.sequence
                ),
            );
        }

        let is_genesis = entry.entry_type == LedgerEntryType::Genesis;
        if is_genesis != (position == 0) {
            return anomaly(
                total_supply,
                BTreeMap::new(),
                format!("LEDGER_ANOMALY: misplaced genesis entry at position {position}"),
            );
        }

        if entry.amount == 0
            || validate_parties(entry.entry_type, entry.from.is_some(), entry.spender.is_some())
                .is_err()
        {
            return anomaly(
                total_supply,
                BTreeMap::new(),
                format!("LEDGER_ANOMALY: malformed entry at position {position}"),
            );
        }
    }

    ConservationResult::Balanced
}

fn anomaly(
    total_supply: Amount,
    imbalances: BTreeMap<Address, (Amount, Amount)>,
    message: String,
) -> ConservationResult {
    ConservationResult::Anomaly(LedgerAnomaly {
        imbalances,
        total_supply,
        message,
    })
}

/// Construct an anomaly result for arithmetic overflow during summation.
fn overflow_anomaly(total_supply: Amount, context: &str) -> ConservationResult {
    anomaly(
        total_supply,
        BTreeMap::new(),
        format!("LEDGER_ANOMALY: arithmetic overflow while summing {context}"),
    )
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use investor_types::LedgerEntryId;

    use super::*;

    /// Helper to create a journal entry without going through the builder.
    fn make_entry(
        sequence: u64,
        entry_type: LedgerEntryType,
        from: Option<Address>,
        to: Address,
        amount: Amount,
    ) -> LedgerEntry {
        LedgerEntry {
            id: LedgerEntryId::new(),
            sequence,
            entry_type,
            from,
            to,
            spender: None,
            amount,
            created_at: Utc::now(),
        }
    }

    fn genesis_and_transfer(deployer: Address, player: Address) -> Vec<LedgerEntry> {
        vec![
            make_entry(0, LedgerEntryType::Genesis, None, deployer, 1_000),
            make_entry(1, LedgerEntryType::Transfer, Some(deployer), player, 250),
        ]
    }

    #[test]
    fn empty_journal_with_zero_supply_balances() {
        let result = verify_conservation(0, &BTreeMap::new(), &[]);
        assert_eq!(result, ConservationResult::Balanced);
    }

    #[test]
    fn consistent_balances_pass() {
        let deployer = Address::new();
        let player = Address::new();
        let entries = genesis_and_transfer(deployer, player);
        let balances = BTreeMap::from([(deployer, 750), (player, 250)]);

        assert!(verify_conservation(1_000, &balances, &entries).is_balanced());
        assert!(verify_conservation_strict(1_000, &balances, &entries).is_balanced());
    }

    #[test]
    fn tampered_balance_detected() {
        let deployer = Address::new();
        let player = Address::new();
        let entries = genesis_and_transfer(deployer, player);
        let balances = BTreeMap::from([(deployer, 750), (player, 300)]);

        let result = verify_conservation(1_000, &balances, &entries);
        assert!(matches!(
            &result,
            ConservationResult::Anomaly(a)
                if a.imbalances.get(&player) == Some(&(250, 300))
                    && a.message.contains("LEDGER_ANOMALY")
        ));
    }

    #[test]
    fn supply_mismatch_detected() {
        let deployer = Address::new();
        let entries = vec![make_entry(0, LedgerEntryType::Genesis, None, deployer, 1_000)];
        let balances = BTreeMap::from([(deployer, 1_000)]);

        let result = verify_conservation(2_000, &balances, &entries);
        assert!(!result.is_balanced());
    }

    #[test]
    fn replay_overdraft_detected() {
        let deployer = Address::new();
        let player = Address::new();
        let entries = vec![
            make_entry(0, LedgerEntryType::Genesis, None, deployer, 10),
            make_entry(1, LedgerEntryType::Transfer, Some(player), deployer, 5),
        ];
        let balances = BTreeMap::from([(deployer, 15)]);

        let result = verify_conservation(10, &balances, &entries);
        assert!(!result.is_balanced());
    }

    #[test]
    fn strict_detects_sequence_gap() {
        let deployer = Address::new();
        let player = Address::new();
        let entries = vec![
            make_entry(0, LedgerEntryType::Genesis, None, deployer, 1_000),
            make_entry(2, LedgerEntryType::Transfer, Some(deployer), player, 250),
        ];
        let balances = BTreeMap::from([(deployer, 750), (player, 250)]);

        assert!(verify_conservation(1_000, &balances, &entries).is_balanced());
        assert!(!verify_conservation_strict(1_000, &balances, &entries).is_balanced());
    }

    #[test]
    fn strict_detects_second_genesis() {
        let deployer = Address::new();
        let entries = vec![
            make_entry(0, LedgerEntryType::Genesis, None, deployer, 500),
            make_entry(1, LedgerEntryType::Genesis, None, deployer, 500),
        ];
        let balances = BTreeMap::from([(deployer, 1_000)]);

        assert!(verify_conservation(1_000, &balances, &entries).is_balanced());
        assert!(!verify_conservation_strict(1_000, &balances, &entries).is_balanced());
    }
}
