//! Enumeration types for the Idle Investor ledger.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Property types
// ---------------------------------------------------------------------------

/// A purchasable, reward-yielding asset class.
///
/// Each variant has a wire tag (`Basic = 0`, `Medium = 1`, `Premium = 2`)
/// used by callers that address properties numerically. Cost and yield
/// are not properties of the variant itself; they come from the catalog
/// fixed at deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum PropertyType {
    /// Entry-level property.
    Basic,
    /// Mid-tier property.
    Medium,
    /// Top-tier property.
    Premium,
}

impl PropertyType {
    /// Every variant, in tag order.
    pub const ALL: [Self; 3] = [Self::Basic, Self::Medium, Self::Premium];

    /// Return the numeric wire tag for this variant.
    pub const fn tag(self) -> u8 {
        match self {
            Self::Basic => 0,
            Self::Medium => 1,
            Self::Premium => 2,
        }
    }

    /// Resolve a numeric wire tag, returning `None` for unknown tags.
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Basic),
            1 => Some(Self::Medium),
            2 => Some(Self::Premium),
            _ => None,
        }
    }
}

impl core::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Basic => "BASIC",
            Self::Medium => "MEDIUM",
            Self::Premium => "PREMIUM",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Currency journal
// ---------------------------------------------------------------------------

/// The category of a currency journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum LedgerEntryType {
    /// The one-time mint of the entire supply to the deployer.
    Genesis,
    /// A holder moving its own funds.
    Transfer,
    /// A spender moving an owner's funds against a prior approval.
    DelegatedTransfer,
}
