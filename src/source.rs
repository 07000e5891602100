//! The two capabilities the depth cache consumes from an exchange.
//!
//! [`RestClient`](crate::client::RestClient) and
//! [`DepthStreamClient`](crate::client::DepthStreamClient) implement these
//! for Binance. Tests and other venues can supply their own.

use std::future::Future;

use futures_util::Stream;

use crate::error::Error;
use crate::types::{DeltaEvent, Snapshot};

/// One-shot full order book snapshot
pub trait SnapshotSource {
    /// Fetch the current book for `symbol`.
    ///
    /// # Errors
    ///
    /// Network failures (`Error::Http`, `Error::Api`, `Error::RateLimited`)
    /// or decode failures (`Error::Json`, `Error::Decode`).
    fn fetch_snapshot(&self, symbol: &str) -> impl Future<Output = Result<Snapshot, Error>> + Send;
}

/// Live stream of delta events in delivery order
pub trait DeltaSource {
    /// Stream of events. Ends (or yields [`Error::ConnectionClosed`]) when
    /// the feed is lost.
    type Stream: Stream<Item = Result<DeltaEvent, Error>> + Send + Unpin;

    /// Start receiving deltas for `symbol`.
    ///
    /// # Errors
    ///
    /// Returns an error if the subscription cannot be established.
    fn subscribe(&self, symbol: &str) -> impl Future<Output = Result<Self::Stream, Error>> + Send;
}
