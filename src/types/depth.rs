//! Order book primitives shared by the depth cache and the exchange adapters.

use super::{Price, Quantity, UpdateId};
use crate::error::Error;

/// Book side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Buy side, best level is the highest price
    Bid,
    /// Sell side, best level is the lowest price
    Ask,
}

impl Side {
    /// Enumeration order that yields the best level first
    pub const fn best_first(self) -> SortOrder {
        match self {
            Side::Bid => SortOrder::Descending,
            Side::Ask => SortOrder::Ascending,
        }
    }
}

/// Price ordering for level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Lowest price first
    Ascending,
    /// Highest price first
    Descending,
}

/// A single price level: total resting quantity at one price.
///
/// A quantity of zero in a delta means "remove this level"; zero-quantity
/// levels are never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PriceLevel {
    /// Price of the level
    pub price: Price,
    /// Quantity resting at this price
    pub quantity: Quantity,
}

impl PriceLevel {
    /// Create a new price level
    pub const fn new(price: Price, quantity: Quantity) -> Self {
        Self { price, quantity }
    }

    /// Reject non-positive prices and negative quantities.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLevel`] for malformed levels.
    pub fn validate(&self) -> Result<(), Error> {
        if self.price.is_sign_negative() || self.price.is_zero() || self.quantity.is_sign_negative()
        {
            return Err(Error::InvalidLevel {
                price: self.price,
                quantity: self.quantity,
            });
        }
        Ok(())
    }

    /// Whether this level removes the price from the book
    pub fn is_removal(&self) -> bool {
        self.quantity.is_zero()
    }
}

impl From<(Price, Quantity)> for PriceLevel {
    fn from((price, quantity): (Price, Quantity)) -> Self {
        Self::new(price, quantity)
    }
}

/// Full order book state at one instant, as returned by the REST API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Exchange update id the snapshot reflects
    pub last_update_id: UpdateId,
    /// Bid levels
    pub bids: Vec<PriceLevel>,
    /// Ask levels
    pub asks: Vec<PriceLevel>,
}

impl Snapshot {
    /// Create a snapshot
    pub fn new(last_update_id: UpdateId, bids: Vec<PriceLevel>, asks: Vec<PriceLevel>) -> Self {
        Self {
            last_update_id,
            bids,
            asks,
        }
    }

    /// Validate every level in the snapshot
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLevel`] for the first malformed level.
    pub fn validate(&self) -> Result<(), Error> {
        self.bids
            .iter()
            .chain(&self.asks)
            .try_for_each(PriceLevel::validate)
    }
}

/// Incremental change covering the exchange updates
/// `first_update_id..=last_update_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaEvent {
    /// First update id in the event
    pub first_update_id: UpdateId,
    /// Last update id in the event
    pub last_update_id: UpdateId,
    /// Bid level upserts (zero quantity removes)
    pub bids: Vec<PriceLevel>,
    /// Ask level upserts (zero quantity removes)
    pub asks: Vec<PriceLevel>,
}

impl DeltaEvent {
    /// Create a delta event
    pub fn new(
        first_update_id: UpdateId,
        last_update_id: UpdateId,
        bids: Vec<PriceLevel>,
        asks: Vec<PriceLevel>,
    ) -> Self {
        Self {
            first_update_id,
            last_update_id,
            bids,
            asks,
        }
    }

    /// Validate the update range and every level
    ///
    /// # Errors
    ///
    /// [`Error::InvalidUpdateRange`] if `first_update_id > last_update_id`,
    /// [`Error::InvalidLevel`] for the first malformed level.
    pub fn validate(&self) -> Result<(), Error> {
        if self.first_update_id > self.last_update_id {
            return Err(Error::InvalidUpdateRange {
                first: self.first_update_id,
                last: self.last_update_id,
            });
        }
        self.bids
            .iter()
            .chain(&self.asks)
            .try_for_each(PriceLevel::validate)
    }

    /// Changes for one side
    pub fn changes(&self, side: Side) -> &[PriceLevel] {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validate_level() {
        assert!(PriceLevel::new(dec!(10), dec!(1)).validate().is_ok());
        assert!(PriceLevel::new(dec!(10), dec!(0)).validate().is_ok());
        assert!(matches!(
            PriceLevel::new(dec!(10), dec!(-1)).validate(),
            Err(Error::InvalidLevel { .. })
        ));
        assert!(PriceLevel::new(dec!(-10), dec!(1)).validate().is_err());
        assert!(PriceLevel::new(dec!(0), dec!(1)).validate().is_err());
    }

    #[test]
    fn test_delta_range_validation() {
        let delta = DeltaEvent::new(10, 9, vec![], vec![]);
        assert!(matches!(
            delta.validate(),
            Err(Error::InvalidUpdateRange { first: 10, last: 9 })
        ));

        let delta = DeltaEvent::new(10, 10, vec![], vec![PriceLevel::new(dec!(1), dec!(-2))]);
        assert!(matches!(delta.validate(), Err(Error::InvalidLevel { .. })));
    }

    #[test]
    fn test_best_first_order() {
        assert_eq!(Side::Bid.best_first(), SortOrder::Descending);
        assert_eq!(Side::Ask.best_first(), SortOrder::Ascending);
    }
}
