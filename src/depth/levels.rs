//! One side of the book as a sorted price → quantity map.
//!
//! This implementation uses `BTreeMap` for sorted price levels, providing:
//!
//! - O(log n) insertion, deletion, and lookup
//! - O(log n) access to the best level from either end
//! - Ordered, restartable iteration in both directions

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::iter::Rev;

use crate::types::{Price, PriceLevel, Quantity, SortOrder};

/// Sorted price levels for one side of the book.
///
/// Keys are exact decimals, so there is never more than one entry per
/// price. A level with zero quantity is never present: [`upsert`] with a
/// zero quantity removes the level.
///
/// The map does not validate its input. Negative values are rejected by
/// [`PriceLevel::validate`] before they reach it.
///
/// [`upsert`]: PriceLevelMap::upsert
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceLevelMap {
    levels: BTreeMap<Price, Quantity>,
}

impl PriceLevelMap {
    /// Create an empty map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the quantity at `price`, removing the level when `quantity` is zero
    pub fn upsert(&mut self, price: Price, quantity: Quantity) {
        if quantity.is_zero() {
            self.levels.remove(&price);
        } else {
            self.levels.insert(price, quantity);
        }
    }

    /// Apply a batch of level upserts in order
    pub fn apply(&mut self, changes: &[PriceLevel]) {
        for level in changes {
            self.upsert(level.price, level.quantity);
        }
    }

    /// Quantity at `price`, or `None` if there is no liquidity there
    #[must_use]
    pub fn get(&self, price: &Price) -> Option<Quantity> {
        self.levels.get(price).copied()
    }

    /// Levels sorted by price in the requested direction
    pub fn levels(&self, order: SortOrder) -> Levels<'_> {
        match order {
            SortOrder::Ascending => Levels::Ascending(self.levels.iter()),
            SortOrder::Descending => Levels::Descending(self.levels.iter().rev()),
        }
    }

    /// First level in the given order (lowest ask / highest bid)
    #[must_use]
    pub fn best(&self, order: SortOrder) -> Option<PriceLevel> {
        let entry = match order {
            SortOrder::Ascending => self.levels.first_key_value(),
            SortOrder::Descending => self.levels.last_key_value(),
        };
        entry.map(|(&price, &quantity)| PriceLevel::new(price, quantity))
    }

    /// The first `n` levels in the given order
    #[must_use]
    pub fn top(&self, order: SortOrder, n: usize) -> Vec<PriceLevel> {
        self.levels(order).take(n).collect()
    }

    /// Copy of the first `n` levels in the given order as a new map
    #[must_use]
    pub fn truncated(&self, order: SortOrder, n: usize) -> Self {
        Self {
            levels: self
                .levels(order)
                .take(n)
                .map(|level| (level.price, level.quantity))
                .collect(),
        }
    }

    /// Sum of quantity across all levels
    #[must_use]
    pub fn total_quantity(&self) -> Quantity {
        self.levels.values().sum()
    }

    /// Number of price levels
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Whether the side has no levels
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Remove every level
    pub fn clear(&mut self) {
        self.levels.clear();
    }
}

impl FromIterator<PriceLevel> for PriceLevelMap {
    fn from_iter<I: IntoIterator<Item = PriceLevel>>(iter: I) -> Self {
        let mut map = Self::new();
        for level in iter {
            map.upsert(level.price, level.quantity);
        }
        map
    }
}

/// Lazy iterator over a [`PriceLevelMap`] in one direction.
///
/// Cloning the iterator restarts from the current position without
/// touching the map.
#[derive(Debug, Clone)]
pub enum Levels<'a> {
    /// Lowest price first
    Ascending(btree_map::Iter<'a, Price, Quantity>),
    /// Highest price first
    Descending(Rev<btree_map::Iter<'a, Price, Quantity>>),
}

impl Iterator for Levels<'_> {
    type Item = PriceLevel;

    fn next(&mut self) -> Option<Self::Item> {
        let (&price, &quantity) = match self {
            Levels::Ascending(iter) => iter.next()?,
            Levels::Descending(iter) => iter.next()?,
        };
        Some(PriceLevel::new(price, quantity))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Levels::Ascending(iter) => iter.size_hint(),
            Levels::Descending(iter) => iter.size_hint(),
        }
    }
}

impl ExactSizeIterator for Levels<'_> {}
