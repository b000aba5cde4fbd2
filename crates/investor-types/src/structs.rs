//! Core entity structs: player accounts, holdings, journal entries, events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{LedgerEntryType, PropertyType};
use crate::ids::{Address, LedgerEntryId, TokenId};
use crate::units::{Amount, Timestamp};

// ---------------------------------------------------------------------------
// Holdings
// ---------------------------------------------------------------------------

/// Property counts per [`PropertyType`].
///
/// This is also the snapshot returned by `get_player_properties`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PropertyHoldings {
    /// Units of [`PropertyType::Basic`] held.
    pub basic: u64,
    /// Units of [`PropertyType::Medium`] held.
    pub medium: u64,
    /// Units of [`PropertyType::Premium`] held.
    pub premium: u64,
}

impl PropertyHoldings {
    /// Holdings with every count at zero.
    pub const EMPTY: Self = Self {
        basic: 0,
        medium: 0,
        premium: 0,
    };

    /// Return the count held of one property type.
    pub const fn count(&self, property: PropertyType) -> u64 {
        match property {
            PropertyType::Basic => self.basic,
            PropertyType::Medium => self.medium,
            PropertyType::Premium => self.premium,
        }
    }

    /// Return a copy with `quantity` more units of `property`.
    ///
    /// Returns `None` if the count would overflow.
    #[must_use]
    pub fn checked_add(self, property: PropertyType, quantity: u64) -> Option<Self> {
        let mut next = self;
        let slot = match property {
            PropertyType::Basic => &mut next.basic,
            PropertyType::Medium => &mut next.medium,
            PropertyType::Premium => &mut next.premium,
        };
        *slot = slot.checked_add(quantity)?;
        Some(next)
    }

    /// Iterate `(property, count)` pairs in tag order.
    pub fn iter(&self) -> impl Iterator<Item = (PropertyType, u64)> + '_ {
        PropertyType::ALL
            .into_iter()
            .map(move |property| (property, self.count(property)))
    }

    /// Whether no property of any type is held.
    pub const fn is_empty(&self) -> bool {
        self.basic == 0 && self.medium == 0 && self.premium == 0
    }
}

// ---------------------------------------------------------------------------
// Player account
// ---------------------------------------------------------------------------

/// Persistent per-address game state.
///
/// Pending rewards are not stored: they are always recomputed
/// from `holdings`, `last_settled_at`, and the current time.
/// `banked_rewards` and `accrual_remainder` hold only value that a
/// purchase or claim already settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlayerAccount {
    /// Set exactly once, by a successful registration.
    pub joined: bool,
    /// Property counts per type. Only ever increase.
    pub holdings: PropertyHoldings,
    /// Time up to which accrual has been accounted for.
    pub last_settled_at: Timestamp,
    /// Rewards settled by a purchase and not yet claimed.
    pub banked_rewards: Amount,
    /// Settled accrual below one base unit, in base-unit-seconds.
    /// Always less than the rate period.
    pub accrual_remainder: Amount,
    /// Credential minted on registration.
    pub credential: Option<TokenId>,
    /// Registration time.
    pub joined_at: Option<Timestamp>,
    /// Lifetime rewards paid out by claims.
    pub total_claimed: Amount,
}

impl PlayerAccount {
    /// The state of an address that has never registered.
    pub const fn unregistered() -> Self {
        Self {
            joined: false,
            holdings: PropertyHoldings::EMPTY,
            last_settled_at: 0,
            banked_rewards: 0,
            accrual_remainder: 0,
            credential: None,
            joined_at: None,
            total_claimed: 0,
        }
    }
}

impl Default for PlayerAccount {
    fn default() -> Self {
        Self::unregistered()
    }
}

// ---------------------------------------------------------------------------
// Currency journal
// ---------------------------------------------------------------------------

/// A single currency movement recorded by the currency ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LedgerEntry {
    /// Unique entry identifier.
    pub id: LedgerEntryId,
    /// Position in the journal, starting at zero.
    pub sequence: u64,
    /// The category of movement.
    pub entry_type: LedgerEntryType,
    /// Debited holder (`None` for genesis).
    pub from: Option<Address>,
    /// Credited holder.
    pub to: Address,
    /// Spender whose allowance was consumed, for delegated transfers.
    pub spender: Option<Address>,
    /// Base units moved (always positive).
    pub amount: Amount,
    /// Real-world timestamp.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Game events
// ---------------------------------------------------------------------------

/// Details of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlayerJoinedDetails {
    /// The registered player.
    pub player: Address,
    /// Welcome grant paid.
    pub grant: Amount,
    /// Credential minted to the player.
    pub credential: TokenId,
    /// Registration time.
    pub at: Timestamp,
}

/// Details of a successful property purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PropertyPurchasedDetails {
    /// The buyer.
    pub player: Address,
    /// Property type bought.
    pub property: PropertyType,
    /// Units bought.
    pub quantity: u64,
    /// Total price paid.
    pub cost: Amount,
    /// Rewards settled into the bank by this purchase.
    pub settled: Amount,
    /// Purchase time.
    pub at: Timestamp,
}

/// Details of a successful non-zero claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RewardsClaimedDetails {
    /// The claiming player.
    pub player: Address,
    /// Rewards paid out.
    pub amount: Amount,
    /// Claim time.
    pub at: Timestamp,
}

/// A committed game operation.
///
/// Rolled-back operations never produce an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "type", content = "details")]
pub enum GameEvent {
    /// A player registered.
    PlayerJoined(PlayerJoinedDetails),
    /// A player bought properties.
    PropertyPurchased(PropertyPurchasedDetails),
    /// A player claimed accrued rewards.
    RewardsClaimed(RewardsClaimedDetails),
}

impl GameEvent {
    /// The player the event concerns.
    pub const fn player(&self) -> Address {
        match self {
            Self::PlayerJoined(d) => d.player,
            Self::PropertyPurchased(d) => d.player,
            Self::RewardsClaimed(d) => d.player,
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregate statistics
// ---------------------------------------------------------------------------

/// Aggregate counters over every committed game operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GameStats {
    /// Registered players.
    pub total_players: u64,
    /// Units sold per property type.
    pub properties_sold: PropertyHoldings,
    /// Currency received from purchases.
    pub purchase_revenue: Amount,
    /// Currency paid out as welcome grants.
    pub grants_paid: Amount,
    /// Currency paid out by claims.
    pub rewards_paid: Amount,
    /// Number of non-zero claims.
    pub claims: u64,
}
