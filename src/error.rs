//! Error types for the binance-depth-cache crate.
//!
//! This module defines the errors that can occur while fetching snapshots,
//! consuming the diff-depth stream, and feeding both into a
//! [`DepthCache`](crate::depth::DepthCache).
//!
//! Sequence reconciliation outcomes (ignored, buffered, resync required) are
//! not errors; they are reported through
//! [`ApplyStatus`](crate::depth::ApplyStatus).

use rust_decimal::Decimal;
use thiserror::Error;

/// The main error type for this crate
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// WebSocket error
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Message decoded but did not have the expected shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// Invalid configuration (missing fields, bad format)
    #[error("Configuration error: {0}")]
    Config(String),

    /// API returned an error response
    #[error("API error ({}): {}", .0.status, .0.message)]
    Api(ApiError),

    /// Rate limit exceeded (HTTP 429) or IP banned (HTTP 418)
    #[error("Rate limited{}", .retry_after_ms.map(|ms| format!(", retry after {ms}ms")).unwrap_or_default())]
    RateLimited {
        /// Retry after this many milliseconds
        retry_after_ms: Option<u64>,
    },

    /// Delta stream closed
    #[error("Depth stream closed")]
    ConnectionClosed,

    /// Price level with a non-positive price or negative quantity
    #[error("Invalid level: price {price}, quantity {quantity}")]
    InvalidLevel {
        /// Offending price
        price: Decimal,
        /// Offending quantity
        quantity: Decimal,
    },

    /// Delta event whose first update id is past its last update id
    #[error("Invalid update range: first {first} > last {last}")]
    InvalidUpdateRange {
        /// First update id of the event
        first: u64,
        /// Last update id of the event
        last: u64,
    },

    /// Bootstrap called on a live cache without a reset
    #[error("Depth cache already live at update {last_update_id}")]
    AlreadyLive {
        /// Update id the cache is currently synchronized to
        last_update_id: u64,
    },

    /// Invalid trading pair symbol
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),
}

/// Error returned by the Binance API
#[derive(Debug, Clone)]
pub struct ApiError {
    /// HTTP status code
    pub status: u16,
    /// Binance error code (negative, e.g. -1121 for an invalid symbol)
    pub code: Option<i64>,
    /// Error message
    pub message: String,
}

impl Error {
    /// Whether this is a transport-level failure (the request never produced data)
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::WebSocket(_) | Error::Api(_) | Error::RateLimited { .. }
        )
    }

    /// Whether the payload arrived but could not be decoded
    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Json(_) | Error::Decode(_))
    }
}

impl ApiError {
    /// Create a new API error
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            code: None,
            message: message.into(),
        }
    }

    /// Create an API error with a Binance error code
    pub fn with_code(status: u16, code: i64, message: impl Into<String>) -> Self {
        Self {
            status,
            code: Some(code),
            message: message.into(),
        }
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }
}
