//! Local depth cache: the order book replica and its sequencing rules.
//!
//! - [`levels`] - Sorted price → quantity map for one side
//! - [`sequencer`] - Stale / ready / gap classification and the replay buffer
//! - [`cache`] - [`DepthCache`], both sides plus the sequencer behind one lock
//! - [`view`] - Pure read-only views over a [`CacheSnapshot`]
//!
//! # Example
//!
//! ```rust
//! use binance_depth_cache::depth::{view, DepthCache};
//! use binance_depth_cache::types::{PriceLevel, Snapshot};
//! use rust_decimal::Decimal;
//!
//! let cache = DepthCache::new("ETHBTC");
//! let level = |p: i64, q: i64| PriceLevel::new(Decimal::from(p), Decimal::from(q));
//! cache.bootstrap(Snapshot::new(1, vec![level(45, 100)], vec![level(55, 100)]))?;
//!
//! let snapshot = cache.snapshot();
//! assert_eq!(view::mid_price(&snapshot), Some(Decimal::from(50)));
//! println!("{}", view::render(&snapshot, 10));
//! # Ok::<(), binance_depth_cache::Error>(())
//! ```

pub mod cache;
pub mod levels;
pub mod sequencer;
pub mod view;

pub use cache::{ApplyStatus, BootstrapReport, CacheSnapshot, CacheState, DepthCache, TopOfBook};
pub use levels::{Levels, PriceLevelMap};
pub use sequencer::{Decision, Sequencer, DEFAULT_BUFFER_CAPACITY};
