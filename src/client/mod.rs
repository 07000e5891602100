//! Binance clients for the two depth feeds.
//!
//! This module contains:
//!
//! - [`rest`] - HTTP client for the order book snapshot
//! - [`websocket`] - WebSocket client for the diff-depth stream

pub mod rest;
pub mod websocket;

pub use rest::RestClient;
pub use websocket::{DepthStream, DepthStreamClient, ReconnectConfig};
