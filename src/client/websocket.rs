//! WebSocket client for the Binance diff-depth stream.
//!
//! This module provides the [`DepthStreamClient`], which connects to the
//! raw `<symbol>@depth` stream and yields decoded [`DeltaEvent`]s.
//!
//! # Example
//!
//! ```rust,no_run
//! use binance_depth_cache::client::DepthStreamClient;
//! use binance_depth_cache::Config;
//! use futures_util::StreamExt;
//!
//! # async fn example() -> binance_depth_cache::Result<()> {
//! let client = DepthStreamClient::new(&Config::new("ETHBTC"))?;
//! let mut stream = client.connect("ETHBTC").await?;
//!
//! while let Some(delta) = stream.next().await {
//!     let delta = delta?;
//!     println!("updates {}..={}", delta.first_update_id, delta.last_update_id);
//! }
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::time::Duration;

use futures_util::stream::BoxStream;
use futures_util::{future, StreamExt};
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use crate::config::{Config, UpdateSpeed};
use crate::error::Error;
use crate::source::DeltaSource;
use crate::types::messages::DepthUpdateMsg;
use crate::types::DeltaEvent;

/// Decoded delta events from one WebSocket connection
pub type DepthStream = BoxStream<'static, Result<DeltaEvent, Error>>;

/// WebSocket client for diff-depth events
///
/// Each [`connect`](DepthStreamClient::connect) opens a fresh connection;
/// the returned stream ends when the server closes it. Reconnecting is up
/// to the caller (see [`Maintainer`](crate::maintainer::Maintainer)).
#[derive(Debug, Clone)]
pub struct DepthStreamClient {
    base_url: Url,
    update_speed: UpdateSpeed,
}

impl DepthStreamClient {
    /// Create a new stream client
    ///
    /// # Errors
    ///
    /// Returns an error if the configured WebSocket URL is invalid.
    pub fn new(config: &Config) -> Result<Self, Error> {
        Ok(Self {
            base_url: Url::parse(config.websocket_url())?,
            update_speed: config.update_speed(),
        })
    }

    /// Full stream URL for `symbol`
    pub fn stream_url(&self, symbol: &str) -> String {
        format!(
            "{}/{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            symbol.to_ascii_lowercase(),
            self.update_speed.stream_suffix()
        )
    }

    /// Connect to the diff-depth stream for `symbol`
    ///
    /// # Errors
    ///
    /// Returns an error if the WebSocket handshake fails.
    pub async fn connect(&self, symbol: &str) -> Result<DepthStream, Error> {
        let url = self.stream_url(symbol);
        let (ws_stream, _response) = tokio_tungstenite::connect_async(url.as_str()).await?;
        tracing::info!(url = %url, "Depth stream connected");

        // tungstenite queues pong replies to pings and flushes them on the next read
        let stream = ws_stream.filter_map(|message| {
            future::ready(match message {
                Ok(Message::Text(text)) => Some(decode_event(&text)),
                Ok(Message::Close(frame)) => {
                    tracing::info!(?frame, "Depth stream closed by server");
                    Some(Err(Error::ConnectionClosed))
                }
                // Ignore other message types (Binary, Ping, Pong, Frame)
                Ok(_) => None,
                Err(e) => Some(Err(e.into())),
            })
        });

        Ok(stream.boxed())
    }
}

/// Decode one text frame into a delta event
fn decode_event(text: &str) -> Result<DeltaEvent, Error> {
    let msg: DepthUpdateMsg = serde_json::from_str(text)?;
    DeltaEvent::try_from(msg)
}

impl DeltaSource for DepthStreamClient {
    type Stream = DepthStream;

    fn subscribe(&self, symbol: &str) -> impl Future<Output = Result<Self::Stream, Error>> + Send {
        self.connect(symbol)
    }
}

/// Configuration for reconnection behavior
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Maximum number of consecutive reconnection attempts (0 = infinite)
    pub max_retries: u32,
    /// Initial delay between reconnection attempts
    pub initial_delay_ms: u64,
    /// Maximum delay between reconnection attempts
    pub max_delay_ms: u64,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_retries: 10,
            initial_delay_ms: 100,
            max_delay_ms: 30_000,
            backoff_multiplier: 2.0,
        }
    }
}

impl ReconnectConfig {
    /// Create a new reconnect config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum retries (0 = infinite)
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set initial delay in milliseconds
    pub fn initial_delay_ms(mut self, ms: u64) -> Self {
        self.initial_delay_ms = ms;
        self
    }

    /// Set maximum delay in milliseconds
    pub fn max_delay_ms(mut self, ms: u64) -> Self {
        self.max_delay_ms = ms;
        self
    }

    /// Set backoff multiplier
    pub fn backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Whether `attempt` consecutive failures exhaust the retry budget
    pub fn exhausted(&self, attempt: u32) -> bool {
        self.max_retries > 0 && attempt >= self.max_retries
    }

    /// Calculate delay for a given retry attempt
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self.initial_delay_ms as f64 * self.backoff_multiplier.powi(attempt as i32);
        let delay_ms = delay.min(self.max_delay_ms as f64) as u64;
        Duration::from_millis(delay_ms)
    }
}
