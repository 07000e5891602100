//! Binance wire types.
//!
//! REST depth snapshots (`GET /api/v3/depth`) and diff-depth stream events
//! (`<symbol>@depth`). Prices and quantities arrive as decimal strings and
//! are decoded straight into [`Decimal`].

use rust_decimal::Decimal;
use serde::Deserialize;

use super::depth::{DeltaEvent, PriceLevel, Snapshot};
use super::{TimestampMs, UpdateId};
use crate::error::Error;

/// Event type tag carried by diff-depth messages
pub const DEPTH_UPDATE_EVENT: &str = "depthUpdate";

/// Response from `GET /api/v3/depth`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepthSnapshotMsg {
    /// Update id the book reflects
    pub last_update_id: UpdateId,
    /// Bids: [[price, quantity], ...]
    pub bids: Vec<(Decimal, Decimal)>,
    /// Asks: [[price, quantity], ...]
    pub asks: Vec<(Decimal, Decimal)>,
}

impl From<DepthSnapshotMsg> for Snapshot {
    fn from(msg: DepthSnapshotMsg) -> Self {
        Snapshot::new(
            msg.last_update_id,
            msg.bids.into_iter().map(PriceLevel::from).collect(),
            msg.asks.into_iter().map(PriceLevel::from).collect(),
        )
    }
}

/// Diff-depth stream event
#[derive(Debug, Clone, Deserialize)]
pub struct DepthUpdateMsg {
    /// Event type ("depthUpdate")
    #[serde(rename = "e")]
    pub event_type: String,
    /// Event time (Unix ms)
    #[serde(rename = "E")]
    pub event_time: TimestampMs,
    /// Symbol, uppercase
    #[serde(rename = "s")]
    pub symbol: String,
    /// First update id in event
    #[serde(rename = "U")]
    pub first_update_id: UpdateId,
    /// Final update id in event
    #[serde(rename = "u")]
    pub final_update_id: UpdateId,
    /// Bids to be updated: [[price, quantity], ...]
    #[serde(rename = "b")]
    pub bids: Vec<(Decimal, Decimal)>,
    /// Asks to be updated: [[price, quantity], ...]
    #[serde(rename = "a")]
    pub asks: Vec<(Decimal, Decimal)>,
}

impl TryFrom<DepthUpdateMsg> for DeltaEvent {
    type Error = Error;

    fn try_from(msg: DepthUpdateMsg) -> Result<Self, Self::Error> {
        if msg.event_type != DEPTH_UPDATE_EVENT {
            return Err(Error::Decode(format!(
                "unexpected event type {:?} on depth stream",
                msg.event_type
            )));
        }
        Ok(DeltaEvent::new(
            msg.first_update_id,
            msg.final_update_id,
            msg.bids.into_iter().map(PriceLevel::from).collect(),
            msg.asks.into_iter().map(PriceLevel::from).collect(),
        ))
    }
}

/// Error body returned by the REST API
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorMsg {
    /// Binance error code
    pub code: i64,
    /// Error message
    pub msg: String,
}
