//! The property catalog: per-type cost and yield, fixed at deployment.

use std::collections::BTreeMap;

use serde::Serialize;

use investor_types::{Amount, PropertyType};

use crate::error::GameError;

/// Errors raised while assembling a [`PropertyCatalog`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Yield must be expressed over a non-empty period.
    #[error("rate period must be at least one second")]
    ZeroRatePeriod,

    /// Every listed property must cost something.
    #[error("{property} has a zero unit cost")]
    ZeroUnitCost {
        /// The offending property type.
        property: PropertyType,
    },
}

/// Price and yield of one property type, in currency base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PropertyTerms {
    /// Price of a single unit.
    pub unit_cost: Amount,
    /// Reward accrued per unit held per rate period.
    pub yield_rate: Amount,
}

impl PropertyTerms {
    /// Build terms from a unit cost and yield rate.
    pub const fn new(unit_cost: Amount, yield_rate: Amount) -> Self {
        Self {
            unit_cost,
            yield_rate,
        }
    }
}

/// Immutable table of [`PropertyTerms`] keyed by [`PropertyType`].
///
/// A property type missing from the catalog cannot be bought.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyCatalog {
    terms: BTreeMap<PropertyType, PropertyTerms>,
    rate_period_secs: u64,
}

impl PropertyCatalog {
    /// Build a catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ZeroRatePeriod`] if `rate_period_secs` is
    /// zero, or [`CatalogError::ZeroUnitCost`] for a free property.
    pub fn new(
        rate_period_secs: u64,
        entries: impl IntoIterator<Item = (PropertyType, PropertyTerms)>,
    ) -> Result<Self, CatalogError> {
        if rate_period_secs == 0 {
            return Err(CatalogError::ZeroRatePeriod);
        }

        let mut terms = BTreeMap::new();
        for (property, entry) in entries {
            if entry.unit_cost == 0 {
                return Err(CatalogError::ZeroUnitCost { property });
            }
            terms.insert(property, entry);
        }

        Ok(Self {
            terms,
            rate_period_secs,
        })
    }

    /// Seconds over which `yield_rate` is expressed.
    pub const fn rate_period_secs(&self) -> u64 {
        self.rate_period_secs
    }

    /// Look up the terms of `property`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownPropertyType`] if it is not listed.
    pub fn terms(&self, property: PropertyType) -> Result<PropertyTerms, GameError> {
        self.terms
            .get(&property)
            .copied()
            .ok_or(GameError::UnknownPropertyType {
                tag: property.tag(),
            })
    }

    /// Total price of `quantity` units of `property`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownPropertyType`] for an unlisted type or
    /// [`GameError::ArithmeticOverflow`] if the price does not fit.
    pub fn cost_of(&self, property: PropertyType, quantity: u64) -> Result<Amount, GameError> {
        self.terms(property)?
            .unit_cost
            .checked_mul(Amount::from(quantity))
            .ok_or(GameError::overflow("purchase cost"))
    }

    /// Listed property types with their terms, in tag order.
    pub fn iter(&self) -> impl Iterator<Item = (PropertyType, PropertyTerms)> + '_ {
        self.terms.iter().map(|(property, terms)| (*property, *terms))
    }
}
