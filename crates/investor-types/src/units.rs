//! Currency and time units.
//!
//! All currency values are unsigned base units ([`Amount`]); whole-token
//! values from configuration are scaled by `10^decimals`. Time is whole
//! seconds since the Unix epoch ([`Timestamp`]).

use rust_decimal::Decimal;

/// A quantity of currency in base units.
pub type Amount = u128;

/// Seconds since the Unix epoch.
pub type Timestamp = u64;

/// Largest supported number of currency decimals.
///
/// Bounded by the scale [`Decimal`] can represent for display.
pub const MAX_DECIMALS: u32 = 28;

/// Scale a whole-token value into base units.
///
/// Returns `None` if `decimals` exceeds [`MAX_DECIMALS`] or the result
/// does not fit in an [`Amount`].
pub fn to_base_units(whole: u64, decimals: u32) -> Option<Amount> {
    if decimals > MAX_DECIMALS {
        return None;
    }
    let scale = 10_u128.checked_pow(decimals)?;
    Amount::from(whole).checked_mul(scale)
}

/// Render a base-unit amount as a whole-token [`Decimal`].
///
/// Returns `None` when the amount exceeds what [`Decimal`] can hold.
pub fn to_display(amount: Amount, decimals: u32) -> Option<Decimal> {
    let signed = i128::try_from(amount).ok()?;
    Decimal::try_from_i128_with_scale(signed, decimals)
        .ok()
        .map(|d| d.normalize())
}
