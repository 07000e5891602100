//! Order book and Binance wire types.
//!
//! - [`depth`] - Price levels, snapshots and delta events used by the cache
//! - [`messages`] - REST and WebSocket message types

pub mod depth;
pub mod messages;

pub use depth::{DeltaEvent, PriceLevel, Side, Snapshot, SortOrder};
pub use messages::{DepthSnapshotMsg, DepthUpdateMsg};

/// Price of a level.
///
/// Exact decimal rather than floating point, so `"0.10"` and `"0.1"` map to
/// the same book key and comparisons never drift.
pub type Price = rust_decimal::Decimal;

/// Quantity resting at a level
pub type Quantity = rust_decimal::Decimal;

/// Exchange update id (Binance `lastUpdateId` / `U` / `u`)
pub type UpdateId = u64;

/// Timestamp in milliseconds since Unix epoch
pub type TimestampMs = u64;
