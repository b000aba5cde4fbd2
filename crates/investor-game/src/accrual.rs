//! Time-based reward accrual.
//!
//! Rewards are never stored as a running balance. They are derived from an
//! account's holdings and its settlement cursor. Accrual is tracked in
//! base-unit-seconds so nothing is lost between settlements:
//!
//! ```text
//! owed    = sum(count[t] * yield_rate[t]) * elapsed + accrual_remainder
//! accrued = owed / rate_period
//! pending = banked_rewards + accrued
//! ```
//!
//! where `elapsed = max(0, now - last_settled_at)`. Settling keeps
//! `owed % rate_period` as the new remainder, so a player who settles often
//! earns exactly what one who settles once would. Everything here is pure
//! and uses checked arithmetic; an overflow fails the calculation instead
//! of wrapping.

use investor_types::{Amount, PlayerAccount, PropertyHoldings, Timestamp};

use crate::catalog::PropertyCatalog;
use crate::error::GameError;

/// Accrual split into whole base units and the sub-unit carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accrual {
    /// Whole base units earned.
    pub whole: Amount,
    /// Leftover base-unit-seconds, below the rate period.
    pub remainder: Amount,
}

/// Reward accrued by `holdings` between `since` and `now`, on top of a
/// `carried` remainder from the previous settlement.
///
/// Nothing accrues when `now` is not after `since`.
///
/// # Errors
///
/// Returns [`GameError::ArithmeticOverflow`] if any intermediate value
/// overflows, or [`GameError::UnknownPropertyType`] if a held type is
/// missing from the catalog.
pub fn accrue(
    holdings: &PropertyHoldings,
    catalog: &PropertyCatalog,
    carried: Amount,
    since: Timestamp,
    now: Timestamp,
) -> Result<Accrual, GameError> {
    let elapsed = now.saturating_sub(since);

    let mut per_period: Amount = 0;
    if elapsed > 0 {
        for (property, count) in holdings.iter().filter(|(_, count)| *count > 0) {
            let rate = catalog.terms(property)?.yield_rate;
            let contribution = rate
                .checked_mul(Amount::from(count))
                .ok_or(GameError::overflow("yield per period"))?;
            per_period = per_period
                .checked_add(contribution)
                .ok_or(GameError::overflow("yield per period"))?;
        }
    }

    let owed = per_period
        .checked_mul(Amount::from(elapsed))
        .and_then(|earned| earned.checked_add(carried))
        .ok_or(GameError::overflow("accrued reward"))?;
    let period = Amount::from(catalog.rate_period_secs());
    let whole = owed
        .checked_div(period)
        .ok_or(GameError::overflow("rate period"))?;
    let remainder = owed
        .checked_rem(period)
        .ok_or(GameError::overflow("rate period"))?;
    Ok(Accrual { whole, remainder })
}

/// Pending rewards of `account` at `now`: banked plus freshly accrued.
///
/// An account that never joined has no rewards.
///
/// # Errors
///
/// See [`accrue`].
pub fn pending_rewards(
    account: &PlayerAccount,
    catalog: &PropertyCatalog,
    now: Timestamp,
) -> Result<Amount, GameError> {
    if !account.joined {
        return Ok(0);
    }
    let accrual = accrue(
        &account.holdings,
        catalog,
        account.accrual_remainder,
        account.last_settled_at,
        now,
    )?;
    account
        .banked_rewards
        .checked_add(accrual.whole)
        .ok_or(GameError::overflow("pending rewards"))
}

/// Fold accrual up to `now` into `banked_rewards`, keep the sub-unit carry,
/// and advance the cursor.
///
/// Returns the whole units banked. The account is left untouched on error.
///
/// # Errors
///
/// See [`accrue`].
pub fn settle(
    account: &mut PlayerAccount,
    catalog: &PropertyCatalog,
    now: Timestamp,
) -> Result<Amount, GameError> {
    let accrual = accrue(
        &account.holdings,
        catalog,
        account.accrual_remainder,
        account.last_settled_at,
        now,
    )?;
    let banked = account
        .banked_rewards
        .checked_add(accrual.whole)
        .ok_or(GameError::overflow("banked rewards"))?;

    account.banked_rewards = banked;
    account.accrual_remainder = accrual.remainder;
    account.last_settled_at = account.last_settled_at.max(now);
    Ok(accrual.whole)
}
