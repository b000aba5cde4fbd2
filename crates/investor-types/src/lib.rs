//! Shared type definitions for the Idle Investor game ledger.
//!
//! Every crate in the workspace takes its identifiers, enums, and entity
//! structs from here. Types flow downstream to `TypeScript` via `ts-rs`
//! for dashboards that render player state.
//!
//! # Modules
//!
//! - [`ids`] -- Participant addresses, journal entry ids, credential token ids
//! - [`enums`] -- Property types and currency journal entry types
//! - [`structs`] -- Player accounts, holdings, journal entries, events, stats
//! - [`units`] -- Currency base units, timestamps, whole-token conversion

pub mod enums;
pub mod ids;
pub mod structs;
pub mod units;

// Re-export all public types at crate root for convenience.
pub use enums::{LedgerEntryType, PropertyType};
pub use ids::{Address, LedgerEntryId, TokenId};
pub use structs::{
    GameEvent, GameStats, LedgerEntry, PlayerAccount, PlayerJoinedDetails, PropertyHoldings,
    PropertyPurchasedDetails, RewardsClaimedDetails,
};
pub use units::{Amount, MAX_DECIMALS, Timestamp, to_base_units, to_display};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // ts-rs writes a binding for every type marked #[ts(export)] into
        // `bindings/` relative to the crate root.
        use ts_rs::TS;

        let _ = crate::ids::Address::export_all();
        let _ = crate::ids::LedgerEntryId::export_all();
        let _ = crate::ids::TokenId::export_all();

        let _ = crate::enums::PropertyType::export_all();
        let _ = crate::enums::LedgerEntryType::export_all();

        let _ = crate::structs::PropertyHoldings::export_all();
        let _ = crate::structs::PlayerAccount::export_all();
        let _ = crate::structs::LedgerEntry::export_all();
        let _ = crate::structs::PlayerJoinedDetails::export_all();
        let _ = crate::structs::PropertyPurchasedDetails::export_all();
        let _ = crate::structs::RewardsClaimedDetails::export_all();
        let _ = crate::structs::GameEvent::export_all();
        let _ = crate::structs::GameStats::export_all();
    }
}
