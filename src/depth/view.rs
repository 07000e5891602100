//! Read-only views over a [`CacheSnapshot`].
//!
//! Everything here is a pure function of a point-in-time copy, so display
//! and analytics never hold the cache lock.

use std::fmt;

use rust_decimal::Decimal;

use super::cache::CacheSnapshot;
use crate::types::{Price, PriceLevel, SortOrder, UpdateId};

/// Top levels of both sides, best first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookView {
    /// Bids, highest first
    pub bids: Vec<PriceLevel>,
    /// Asks, lowest first
    pub asks: Vec<PriceLevel>,
    /// Update id the view reflects
    pub last_update_id: Option<UpdateId>,
    /// Whether the source cache was stale
    pub stale: bool,
}

/// Best `n` levels per side
pub fn top_levels(snapshot: &CacheSnapshot, n: usize) -> BookView {
    BookView {
        bids: snapshot.bids.top(SortOrder::Descending, n),
        asks: snapshot.asks.top(SortOrder::Ascending, n),
        last_update_id: snapshot.last_update_id,
        stale: snapshot.is_stale(),
    }
}

/// Average of best bid and best ask, `None` if either side is empty
pub fn mid_price(snapshot: &CacheSnapshot) -> Option<Price> {
    let bid = snapshot.best_bid()?;
    let ask = snapshot.best_ask()?;
    bid.price.checked_add(ask.price)?.checked_div(Decimal::TWO)
}

/// Best ask minus best bid
pub fn spread(snapshot: &CacheSnapshot) -> Option<Price> {
    let bid = snapshot.best_bid()?;
    let ask = snapshot.best_ask()?;
    Some(ask.price - bid.price)
}

/// Spread in basis points of the mid price
pub fn spread_bps(snapshot: &CacheSnapshot) -> Option<Decimal> {
    let spread = spread(snapshot)?;
    let mid = mid_price(snapshot)?;
    spread.checked_div(mid)?.checked_mul(Decimal::from(10_000))
}

/// Book imbalance over the best `depth` levels per side.
///
/// `(bid_qty - ask_qty) / (bid_qty + ask_qty)`, in `[-1, 1]`. Positive
/// means more resting bid quantity. `None` if both sides are empty.
pub fn imbalance(snapshot: &CacheSnapshot, depth: usize) -> Option<Decimal> {
    let bid_qty: Decimal = snapshot
        .bids
        .levels(SortOrder::Descending)
        .take(depth)
        .map(|l| l.quantity)
        .sum();
    let ask_qty: Decimal = snapshot
        .asks
        .levels(SortOrder::Ascending)
        .take(depth)
        .map(|l| l.quantity)
        .sum();

    let total = bid_qty + ask_qty;
    if total.is_zero() {
        return None;
    }
    (bid_qty - ask_qty).checked_div(total)
}

/// Whether best bid >= best ask.
///
/// Never true for a correctly synchronized book; useful as a sanity check.
pub fn is_crossed(snapshot: &CacheSnapshot) -> bool {
    match (snapshot.best_bid(), snapshot.best_ask()) {
        (Some(bid), Some(ask)) => bid.price >= ask.price,
        _ => false,
    }
}

/// Text rendering of the best `n` levels per side
pub fn render(snapshot: &CacheSnapshot, n: usize) -> String {
    top_levels(snapshot, n).to_string()
}

impl fmt::Display for BookView {
    /// Asks from the highest shown down to the best, then bids from the
    /// best down, so the spread sits in the middle.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.last_update_id {
            Some(id) => write!(f, "-------- update {id}")?,
            None => write!(f, "-------- no snapshot")?,
        }
        if self.stale {
            write!(f, " [STALE]")?;
        }
        writeln!(f)?;

        for level in self.asks.iter().rev() {
            writeln!(f, "ask {} {}", level.price, level.quantity)?;
        }
        for level in &self.bids {
            writeln!(f, "bid {} {}", level.price, level.quantity)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depth::{CacheState, PriceLevelMap};
    use rust_decimal_macros::dec;

    fn book(bids: &[(Decimal, Decimal)], asks: &[(Decimal, Decimal)]) -> CacheSnapshot {
        CacheSnapshot {
            bids: bids.iter().copied().map(PriceLevel::from).collect::<PriceLevelMap>(),
            asks: asks.iter().copied().map(PriceLevel::from).collect::<PriceLevelMap>(),
            last_update_id: Some(42),
            state: CacheState::Live,
        }
    }

    #[test]
    fn test_mid_price_and_spread() {
        let snap = book(&[(dec!(45), dec!(100))], &[(dec!(55), dec!(100))]);
        assert_eq!(mid_price(&snap), Some(dec!(50)));
        assert_eq!(spread(&snap), Some(dec!(10)));
        assert_eq!(spread_bps(&snap), Some(dec!(2000)));
    }

    #[test]
    fn test_mid_price_overflow_is_none() {
        let snap = book(&[(Decimal::MAX, dec!(1))], &[(Decimal::MAX, dec!(1))]);
        assert_eq!(mid_price(&snap), None);
        assert_eq!(spread_bps(&snap), None);
    }

    #[test]
    fn test_one_sided_book() {
        let snap = book(&[(dec!(45), dec!(100))], &[]);
        assert_eq!(mid_price(&snap), None);
        assert_eq!(spread(&snap), None);
        assert!(!is_crossed(&snap));
        assert_eq!(imbalance(&snap, 5), Some(dec!(1)));
    }

    #[test]
    fn test_imbalance() {
        let snap = book(
            &[(dec!(10), dec!(3)), (dec!(9), dec!(100))],
            &[(dec!(11), dec!(1))],
        );
        // Depth 1: (3 - 1) / 4
        assert_eq!(imbalance(&snap, 1), Some(dec!(0.5)));
        assert_eq!(imbalance(&book(&[], &[]), 1), None);
    }

    #[test]
    fn test_top_levels_order() {
        let snap = book(
            &[(dec!(9), dec!(1)), (dec!(10), dec!(1)), (dec!(8), dec!(1))],
            &[(dec!(12), dec!(1)), (dec!(11), dec!(1))],
        );
        let view = top_levels(&snap, 2);
        assert_eq!(view.bids[0].price, dec!(10));
        assert_eq!(view.bids[1].price, dec!(9));
        assert_eq!(view.asks[0].price, dec!(11));
        assert_eq!(view.last_update_id, Some(42));
    }

    #[test]
    fn test_crossed() {
        let snap = book(&[(dec!(55), dec!(1))], &[(dec!(50), dec!(1))]);
        assert!(is_crossed(&snap));
    }

    #[test]
    fn test_render() {
        let mut snap = book(
            &[(dec!(10), dec!(1)), (dec!(9), dec!(2))],
            &[(dec!(11), dec!(3)), (dec!(12), dec!(4))],
        );
        let text = render(&snap, 10);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "-------- update 42",
                "ask 12 4",
                "ask 11 3",
                "bid 10 1",
                "bid 9 2"
            ]
        );

        snap.state = CacheState::Stale;
        assert!(render(&snap, 1).starts_with("-------- update 42 [STALE]"));
    }
}
