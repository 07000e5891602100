//! Thread-safe depth cache for one trading pair.
//!
//! This module provides [`DepthCache`], the local replica of an exchange
//! order book kept in sync from one snapshot and a stream of deltas.
//!
//! # Design
//!
//! A single `parking_lot::RwLock` covers both sides, the applied sequence
//! and the out-of-order buffer. `apply` and `bootstrap` hold the write lock
//! for the whole mutation, so readers never see the bid half of a delta
//! without its ask half. Reads copy out under the shared lock.
//!
//! # Lifecycle
//!
//! ```text
//! Empty --bootstrap--> Live --gap / invalidate--> Stale --bootstrap--> Live
//! ```
//!
//! Deltas that arrive while the cache is `Empty` or `Stale` are buffered and
//! replayed by the next successful bootstrap.

use parking_lot::RwLock;
use tracing::{debug, info, trace, warn};

use super::levels::PriceLevelMap;
use super::sequencer::{Decision, Sequencer, DEFAULT_BUFFER_CAPACITY};
use crate::error::Error;
use crate::types::{DeltaEvent, PriceLevel, Side, Snapshot, SortOrder, UpdateId};

/// State of a depth cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// No snapshot applied yet
    Empty,
    /// Synchronized and applying deltas
    Live,
    /// A gap was detected or the stream was lost; needs a new snapshot
    Stale,
}

/// Result of feeding one delta into the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyStatus {
    /// Delta applied; the cache now reflects `last_update_id`
    Applied {
        /// Update id the cache advanced to
        last_update_id: UpdateId,
    },
    /// Delta already covered by the current state and dropped
    Ignored,
    /// Delta held until the next bootstrap
    Buffered {
        /// Events waiting in the buffer
        backlog: usize,
    },
    /// Gap detected; the cache is now stale and must be bootstrapped again
    ResyncRequired,
}

/// Summary of a bootstrap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapReport {
    /// Update id of the snapshot that was applied
    pub snapshot_update_id: UpdateId,
    /// Update id the cache reflects after replaying buffered deltas
    pub last_update_id: UpdateId,
    /// Buffered deltas applied on top of the snapshot
    pub replayed: usize,
    /// Buffered deltas dropped because the snapshot already covered them
    pub discarded: usize,
    /// Deltas still buffered (non-zero only if replay hit a gap)
    pub backlog: usize,
    /// State after the bootstrap: `Live`, or `Stale` if replay hit a gap
    pub state: CacheState,
}

impl BootstrapReport {
    /// Whether the cache came out of the bootstrap live
    pub fn is_live(&self) -> bool {
        self.state == CacheState::Live
    }
}

/// Point-in-time copy of a depth cache.
///
/// Both sides come from the same instant: no delta is half-applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSnapshot {
    /// Bid side
    pub bids: PriceLevelMap,
    /// Ask side
    pub asks: PriceLevelMap,
    /// Last applied update id, `None` before the first bootstrap
    pub last_update_id: Option<UpdateId>,
    /// Cache state when the copy was taken
    pub state: CacheState,
}

impl CacheSnapshot {
    /// Whether the copy is the last known state of a stale cache
    pub fn is_stale(&self) -> bool {
        self.state == CacheState::Stale
    }

    /// Whether the copy was taken from a live cache
    pub fn is_live(&self) -> bool {
        self.state == CacheState::Live
    }

    /// Highest bid
    pub fn best_bid(&self) -> Option<PriceLevel> {
        self.bids.best(Side::Bid.best_first())
    }

    /// Lowest ask
    pub fn best_ask(&self) -> Option<PriceLevel> {
        self.asks.best(Side::Ask.best_first())
    }
}

/// Best bid and ask at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopOfBook {
    /// Highest bid, `None` if there are no bids
    pub bid: Option<PriceLevel>,
    /// Lowest ask, `None` if there are no asks
    pub ask: Option<PriceLevel>,
    /// Last applied update id
    pub last_update_id: Option<UpdateId>,
    /// Whether the values are the last known state of a stale cache
    pub stale: bool,
}

#[derive(Debug)]
struct Inner {
    state: CacheState,
    bids: PriceLevelMap,
    asks: PriceLevelMap,
    sequencer: Sequencer,
}

impl Inner {
    fn apply_event(&mut self, event: &DeltaEvent) {
        self.bids.apply(event.changes(Side::Bid));
        self.asks.apply(event.changes(Side::Ask));
        self.sequencer.advance(event.last_update_id);
    }
}

/// Local order book replica for one symbol.
///
/// # Thread Safety
///
/// Share via `Arc<DepthCache>`. Exactly one task should drive
/// [`apply`](DepthCache::apply) and [`bootstrap`](DepthCache::bootstrap), in
/// stream order; any number of tasks may read.
///
/// # Example
///
/// ```rust
/// use binance_depth_cache::depth::{ApplyStatus, DepthCache};
/// use binance_depth_cache::types::{DeltaEvent, PriceLevel, Snapshot};
/// use rust_decimal::Decimal;
///
/// let cache = DepthCache::new("ETHBTC");
/// let level = |p: i64, q: i64| PriceLevel::new(Decimal::from(p), Decimal::from(q));
///
/// cache.bootstrap(Snapshot::new(100, vec![level(10, 1)], vec![level(11, 2)]))?;
///
/// let status = cache.apply(DeltaEvent::new(101, 101, vec![level(10, 0)], vec![]))?;
/// assert_eq!(status, ApplyStatus::Applied { last_update_id: 101 });
/// assert!(cache.best_bid_ask().bid.is_none());
/// # Ok::<(), binance_depth_cache::Error>(())
/// ```
#[derive(Debug)]
pub struct DepthCache {
    symbol: String,
    inner: RwLock<Inner>,
}

impl DepthCache {
    /// Create an empty cache with the default buffer capacity
    pub fn new(symbol: impl Into<String>) -> Self {
        Self::with_capacity(symbol, DEFAULT_BUFFER_CAPACITY)
    }

    /// Create an empty cache holding at most `capacity` out-of-sequence deltas
    pub fn with_capacity(symbol: impl Into<String>, capacity: usize) -> Self {
        Self {
            symbol: symbol.into(),
            inner: RwLock::new(Inner {
                state: CacheState::Empty,
                bids: PriceLevelMap::new(),
                asks: PriceLevelMap::new(),
                sequencer: Sequencer::new(capacity),
            }),
        }
    }

    /// Symbol this cache tracks
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Replace the book with a snapshot and replay buffered deltas.
    ///
    /// Buffered deltas the snapshot already covers are discarded; the rest
    /// are applied in `first_update_id` order. If the first remaining delta
    /// does not connect to the snapshot the cache stays `Stale` and keeps
    /// the unapplied deltas for the next attempt.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyLive`] if the cache is live (call
    ///   [`reset`](Self::reset) or [`invalidate`](Self::invalidate) first)
    /// - [`Error::InvalidLevel`] if the snapshot holds a malformed level;
    ///   the cache is left untouched
    pub fn bootstrap(&self, snapshot: Snapshot) -> Result<BootstrapReport, Error> {
        snapshot.validate()?;

        let mut guard = self.inner.write();
        let inner = &mut *guard;

        if inner.state == CacheState::Live {
            return Err(Error::AlreadyLive {
                last_update_id: inner.sequencer.last_applied().unwrap_or_default(),
            });
        }

        inner.bids = snapshot.bids.iter().copied().collect();
        inner.asks = snapshot.asks.iter().copied().collect();

        let replay = inner.sequencer.rebase(snapshot.last_update_id);
        let mut discarded = replay.discarded;
        let mut replayed = 0;

        let mut pending = replay.events.into_iter();
        let gap = loop {
            let Some(event) = pending.next() else {
                break None;
            };
            match inner
                .sequencer
                .classify(event.first_update_id, event.last_update_id)
            {
                Decision::Stale => discarded += 1,
                Decision::Ready => {
                    inner.apply_event(&event);
                    replayed += 1;
                }
                Decision::Future => break Some(event),
            }
        };

        let state = match gap {
            None => CacheState::Live,
            Some(event) => {
                warn!(
                    symbol = %self.symbol,
                    snapshot_id = snapshot.last_update_id,
                    expected = inner.sequencer.last_applied().unwrap_or_default() + 1,
                    got_first = event.first_update_id,
                    got_last = event.last_update_id,
                    "Gap between snapshot and buffered deltas, snapshot too old"
                );
                inner
                    .sequencer
                    .requeue(std::iter::once(event).chain(pending));
                CacheState::Stale
            }
        };
        inner.state = state;

        let report = BootstrapReport {
            snapshot_update_id: snapshot.last_update_id,
            last_update_id: inner.sequencer.last_applied().unwrap_or(snapshot.last_update_id),
            replayed,
            discarded,
            backlog: inner.sequencer.backlog(),
            state,
        };

        info!(
            symbol = %self.symbol,
            snapshot_id = report.snapshot_update_id,
            last_update_id = report.last_update_id,
            replayed = report.replayed,
            discarded = report.discarded,
            bid_levels = inner.bids.len(),
            ask_levels = inner.asks.len(),
            live = report.is_live(),
            "Depth cache bootstrapped"
        );

        Ok(report)
    }

    /// Feed one delta from the stream.
    ///
    /// Returns:
    ///
    /// - `Applied` - bid and ask changes applied together
    /// - `Ignored` - the delta is already covered
    /// - `Buffered` - the cache is not live; held for the next bootstrap
    /// - `ResyncRequired` - a gap was found; the cache is now stale
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLevel`] or [`Error::InvalidUpdateRange`] for a
    /// malformed delta, which never reaches the book.
    pub fn apply(&self, delta: DeltaEvent) -> Result<ApplyStatus, Error> {
        delta.validate()?;

        let mut guard = self.inner.write();
        let inner = &mut *guard;

        let decision = inner
            .sequencer
            .classify(delta.first_update_id, delta.last_update_id);

        match (inner.state, decision) {
            (CacheState::Live | CacheState::Stale, Decision::Stale) => {
                debug!(
                    symbol = %self.symbol,
                    last_update_id = delta.last_update_id,
                    applied = inner.sequencer.last_applied(),
                    "Dropping stale delta"
                );
                Ok(ApplyStatus::Ignored)
            }
            (CacheState::Live, Decision::Ready) => {
                inner.apply_event(&delta);
                trace!(
                    symbol = %self.symbol,
                    first_update_id = delta.first_update_id,
                    last_update_id = delta.last_update_id,
                    bids = delta.bids.len(),
                    asks = delta.asks.len(),
                    "Applied delta"
                );
                Ok(ApplyStatus::Applied {
                    last_update_id: delta.last_update_id,
                })
            }
            (CacheState::Live, Decision::Future) => {
                warn!(
                    symbol = %self.symbol,
                    expected = inner.sequencer.last_applied().unwrap_or_default() + 1,
                    got_first = delta.first_update_id,
                    got_last = delta.last_update_id,
                    "Depth sequence gap detected, resync required"
                );
                inner.sequencer.buffer(delta);
                inner.state = CacheState::Stale;
                Ok(ApplyStatus::ResyncRequired)
            }
            (CacheState::Empty | CacheState::Stale, _) => {
                inner.sequencer.buffer(delta);
                let backlog = inner.sequencer.backlog();
                debug!(symbol = %self.symbol, backlog, "Buffered delta until bootstrap");
                Ok(ApplyStatus::Buffered { backlog })
            }
        }
    }

    /// Consistent point-in-time copy of the whole book
    pub fn snapshot(&self) -> CacheSnapshot {
        let inner = self.inner.read();
        CacheSnapshot {
            bids: inner.bids.clone(),
            asks: inner.asks.clone(),
            last_update_id: inner.sequencer.last_applied(),
            state: inner.state,
        }
    }

    /// Consistent copy of only the best `limit` levels per side
    pub fn depth(&self, limit: usize) -> CacheSnapshot {
        let inner = self.inner.read();
        CacheSnapshot {
            bids: inner.bids.truncated(SortOrder::Descending, limit),
            asks: inner.asks.truncated(SortOrder::Ascending, limit),
            last_update_id: inner.sequencer.last_applied(),
            state: inner.state,
        }
    }

    /// Best bid and best ask, read together
    pub fn best_bid_ask(&self) -> TopOfBook {
        let inner = self.inner.read();
        TopOfBook {
            bid: inner.bids.best(SortOrder::Descending),
            ask: inner.asks.best(SortOrder::Ascending),
            last_update_id: inner.sequencer.last_applied(),
            stale: inner.state == CacheState::Stale,
        }
    }

    /// Mark a live cache stale, e.g. after the delta stream was lost.
    ///
    /// The book stays readable (flagged stale) until the next bootstrap.
    pub fn invalidate(&self) {
        let mut inner = self.inner.write();
        if inner.state == CacheState::Live {
            warn!(
                symbol = %self.symbol,
                last_update_id = inner.sequencer.last_applied(),
                "Depth cache invalidated"
            );
            inner.state = CacheState::Stale;
        }
    }

    /// Return to `Empty`, dropping both sides and every buffered delta
    pub fn reset(&self) {
        let mut inner = self.inner.write();
        inner.bids.clear();
        inner.asks.clear();
        inner.sequencer.reset();
        inner.state = CacheState::Empty;
        debug!(symbol = %self.symbol, "Depth cache reset");
    }

    /// Current state
    pub fn state(&self) -> CacheState {
        self.inner.read().state
    }

    /// Whether the cache is live
    pub fn is_live(&self) -> bool {
        self.state() == CacheState::Live
    }

    /// Last applied update id
    pub fn last_update_id(&self) -> Option<UpdateId> {
        self.inner.read().sequencer.last_applied()
    }

    /// Number of deltas buffered for the next bootstrap
    pub fn backlog(&self) -> usize {
        self.inner.read().sequencer.backlog()
    }

    /// Total deltas evicted from a full buffer
    pub fn evicted(&self) -> u64 {
        self.inner.read().sequencer.evicted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn level(price: rust_decimal::Decimal, quantity: rust_decimal::Decimal) -> PriceLevel {
        PriceLevel::new(price, quantity)
    }

    fn bootstrapped(seq: UpdateId) -> DepthCache {
        let cache = DepthCache::new("ETHBTC");
        cache
            .bootstrap(Snapshot::new(
                seq,
                vec![level(dec!(10), dec!(1)), level(dec!(9), dec!(2))],
                vec![level(dec!(11), dec!(1)), level(dec!(12), dec!(3))],
            ))
            .unwrap();
        cache
    }

    #[test]
    fn test_new_cache_is_empty() {
        let cache = DepthCache::new("ETHBTC");
        assert_eq!(cache.symbol(), "ETHBTC");
        assert_eq!(cache.state(), CacheState::Empty);
        assert_eq!(cache.last_update_id(), None);

        let snap = cache.snapshot();
        assert!(snap.bids.is_empty() && snap.asks.is_empty());
        assert!(!snap.is_stale());
    }

    #[test]
    fn test_bootstrap_goes_live() {
        let cache = bootstrapped(100);
        assert!(cache.is_live());
        assert_eq!(cache.last_update_id(), Some(100));

        let top = cache.best_bid_ask();
        assert_eq!(top.bid, Some(level(dec!(10), dec!(1))));
        assert_eq!(top.ask, Some(level(dec!(11), dec!(1))));
        assert!(!top.stale);
    }

    #[test]
    fn test_bootstrap_skips_zero_levels() {
        let cache = DepthCache::new("ETHBTC");
        cache
            .bootstrap(Snapshot::new(
                1,
                vec![level(dec!(10), dec!(0)), level(dec!(9), dec!(1))],
                vec![],
            ))
            .unwrap();
        assert_eq!(cache.snapshot().bids.get(&dec!(10)), None);
        assert_eq!(cache.best_bid_ask().bid, Some(level(dec!(9), dec!(1))));
    }

    #[test]
    fn test_double_bootstrap_rejected() {
        let cache = bootstrapped(100);
        let err = cache
            .bootstrap(Snapshot::new(200, vec![], vec![]))
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyLive { last_update_id: 100 }));
        // State untouched
        assert_eq!(cache.last_update_id(), Some(100));
        assert_eq!(cache.snapshot().bids.len(), 2);

        cache.reset();
        assert_eq!(cache.state(), CacheState::Empty);
        let report = cache.bootstrap(Snapshot::new(200, vec![], vec![])).unwrap();
        assert!(report.is_live());
        assert_eq!(cache.last_update_id(), Some(200));
    }

    #[test]
    fn test_scenario_a_removal_empties_bid_side() {
        let cache = DepthCache::new("ETHBTC");
        cache
            .bootstrap(Snapshot::new(100, vec![level(dec!(10), dec!(1))], vec![]))
            .unwrap();

        let status = cache
            .apply(DeltaEvent::new(101, 101, vec![level(dec!(10), dec!(0))], vec![]))
            .unwrap();
        assert_eq!(status, ApplyStatus::Applied { last_update_id: 101 });
        assert_eq!(cache.best_bid_ask().bid, None);
    }

    #[test]
    fn test_scenario_b_stale_delta_ignored() {
        let cache = bootstrapped(100);
        let before = cache.snapshot();

        let status = cache
            .apply(DeltaEvent::new(95, 99, vec![level(dec!(10), dec!(7))], vec![]))
            .unwrap();
        assert_eq!(status, ApplyStatus::Ignored);
        assert_eq!(cache.snapshot(), before);
    }

    #[test]
    fn test_scenario_c_gap_then_resync() {
        let cache = bootstrapped(100);

        let status = cache
            .apply(DeltaEvent::new(105, 110, vec![level(dec!(10), dec!(5))], vec![]))
            .unwrap();
        assert_eq!(status, ApplyStatus::ResyncRequired);
        assert!(cache.snapshot().is_stale());
        assert!(cache.best_bid_ask().stale);

        // Old deltas are still ignored while stale
        let status = cache
            .apply(DeltaEvent::new(98, 100, vec![level(dec!(10), dec!(9))], vec![]))
            .unwrap();
        assert_eq!(status, ApplyStatus::Ignored);

        let report = cache
            .bootstrap(Snapshot::new(110, vec![level(dec!(20), dec!(4))], vec![]))
            .unwrap();
        assert!(report.is_live());
        assert_eq!(report.discarded, 1);
        assert_eq!(report.replayed, 0);

        let snap = cache.snapshot();
        assert_eq!(snap.last_update_id, Some(110));
        assert_eq!(snap.bids.len(), 1);
        assert_eq!(snap.bids.get(&dec!(20)), Some(dec!(4)));
        assert!(snap.asks.is_empty());
    }

    #[test]
    fn test_no_mutation_while_stale() {
        let cache = bootstrapped(100);
        cache
            .apply(DeltaEvent::new(105, 110, vec![], vec![]))
            .unwrap();
        let frozen = cache.snapshot();

        // Even a delta that would connect to 100 is only buffered now
        let status = cache
            .apply(DeltaEvent::new(101, 104, vec![level(dec!(10), dec!(0))], vec![]))
            .unwrap();
        assert_eq!(status, ApplyStatus::Buffered { backlog: 2 });
        assert_eq!(cache.snapshot(), frozen);
    }

    #[test]
    fn test_scenario_d_reordered_before_bootstrap() {
        let cache = DepthCache::new("ETHBTC");

        let second = DeltaEvent::new(103, 105, vec![level(dec!(10), dec!(3))], vec![]);
        let first = DeltaEvent::new(
            101,
            102,
            vec![level(dec!(10), dec!(2))],
            vec![level(dec!(11), dec!(0))],
        );
        assert_eq!(
            cache.apply(second).unwrap(),
            ApplyStatus::Buffered { backlog: 1 }
        );
        assert_eq!(
            cache.apply(first).unwrap(),
            ApplyStatus::Buffered { backlog: 2 }
        );

        let report = cache
            .bootstrap(Snapshot::new(
                100,
                vec![level(dec!(10), dec!(1))],
                vec![level(dec!(11), dec!(1))],
            ))
            .unwrap();
        assert_eq!(report.replayed, 2);
        assert_eq!(report.last_update_id, 105);

        let snap = cache.snapshot();
        assert_eq!(snap.bids.get(&dec!(10)), Some(dec!(3)));
        assert!(snap.asks.is_empty());
        assert_eq!(snap.last_update_id, Some(105));
    }

    #[test]
    fn test_scenario_d_reordered_after_gap() {
        let snapshot = Snapshot::new(100, vec![level(dec!(10), dec!(1))], vec![]);
        let first = DeltaEvent::new(101, 102, vec![level(dec!(10), dec!(2))], vec![]);
        let second = DeltaEvent::new(103, 105, vec![level(dec!(9), dec!(5))], vec![]);

        let in_order = DepthCache::new("ETHBTC");
        in_order.bootstrap(snapshot.clone()).unwrap();
        in_order.apply(first.clone()).unwrap();
        in_order.apply(second.clone()).unwrap();

        let reversed = DepthCache::new("ETHBTC");
        reversed.bootstrap(snapshot.clone()).unwrap();
        assert_eq!(
            reversed.apply(second).unwrap(),
            ApplyStatus::ResyncRequired
        );
        assert!(matches!(
            reversed.apply(first).unwrap(),
            ApplyStatus::Buffered { .. }
        ));
        let report = reversed.bootstrap(snapshot).unwrap();
        assert!(report.is_live());

        assert_eq!(reversed.snapshot(), in_order.snapshot());
    }

    #[test]
    fn test_replay_gap_keeps_cache_stale() {
        let cache = DepthCache::new("ETHBTC");
        cache.apply(DeltaEvent::new(150, 160, vec![], vec![])).unwrap();
        cache.apply(DeltaEvent::new(161, 170, vec![], vec![])).unwrap();

        // Snapshot is older than the first buffered delta
        let report = cache.bootstrap(Snapshot::new(100, vec![], vec![])).unwrap();
        assert_eq!(report.state, CacheState::Stale);
        assert_eq!(report.backlog, 2);
        assert_eq!(cache.state(), CacheState::Stale);

        // A fresher snapshot connects
        let report = cache.bootstrap(Snapshot::new(155, vec![], vec![])).unwrap();
        assert!(report.is_live());
        assert_eq!(report.replayed, 2);
        assert_eq!(cache.last_update_id(), Some(170));
    }

    #[test]
    fn test_redelivered_buffer_entries_are_discarded() {
        let cache = DepthCache::new("ETHBTC");
        let delta = DeltaEvent::new(101, 101, vec![level(dec!(10), dec!(2))], vec![]);
        cache.apply(delta.clone()).unwrap();
        cache.apply(delta).unwrap();

        let report = cache.bootstrap(Snapshot::new(100, vec![], vec![])).unwrap();
        assert_eq!(report.replayed, 1);
        assert_eq!(report.discarded, 1);
    }

    #[test]
    fn test_invalid_delta_rejected_without_mutation() {
        let cache = bootstrapped(100);
        let before = cache.snapshot();

        let err = cache
            .apply(DeltaEvent::new(
                101,
                101,
                vec![level(dec!(10), dec!(5))],
                vec![level(dec!(11), dec!(-1))],
            ))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidLevel { .. }));
        assert_eq!(cache.snapshot(), before);

        let err = cache.apply(DeltaEvent::new(105, 101, vec![], vec![])).unwrap_err();
        assert!(matches!(err, Error::InvalidUpdateRange { .. }));
    }

    #[test]
    fn test_invalid_snapshot_rejected() {
        let cache = DepthCache::new("ETHBTC");
        let err = cache
            .bootstrap(Snapshot::new(1, vec![level(dec!(-1), dec!(1))], vec![]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidLevel { .. }));
        assert_eq!(cache.state(), CacheState::Empty);
    }

    #[test]
    fn test_invalidate_and_rebootstrap() {
        let cache = bootstrapped(100);
        cache.invalidate();
        assert_eq!(cache.state(), CacheState::Stale);
        // Last known state stays readable
        assert_eq!(cache.snapshot().bids.len(), 2);

        cache.bootstrap(Snapshot::new(120, vec![], vec![])).unwrap();
        assert!(cache.is_live());

        // Invalidate on an empty cache keeps it empty
        let empty = DepthCache::new("ETHBTC");
        empty.invalidate();
        assert_eq!(empty.state(), CacheState::Empty);
    }

    #[test]
    fn test_depth_limit() {
        let cache = bootstrapped(100);
        let top = cache.depth(1);
        assert_eq!(top.bids.len(), 1);
        assert_eq!(top.best_bid(), Some(level(dec!(10), dec!(1))));
        assert_eq!(top.best_ask(), Some(level(dec!(11), dec!(1))));
        assert_eq!(top.last_update_id, Some(100));
    }

    #[test]
    fn test_buffer_capacity_evicts() {
        let cache = DepthCache::with_capacity("ETHBTC", 2);
        for id in 1..=3 {
            cache.apply(DeltaEvent::new(id, id, vec![], vec![])).unwrap();
        }
        assert_eq!(cache.backlog(), 2);
        assert_eq!(cache.evicted(), 1);

        // The evicted [1,1] is missing, so a snapshot at 0 cannot connect
        let report = cache.bootstrap(Snapshot::new(0, vec![], vec![])).unwrap();
        assert_eq!(report.state, CacheState::Stale);
    }
}
