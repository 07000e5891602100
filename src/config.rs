//! Configuration for the Binance depth cache.
//!
//! This module provides the [`Config`] struct for choosing the symbol,
//! environment and synchronization settings.

use std::time::Duration;

use crate::client::websocket::ReconnectConfig;
use crate::depth::DEFAULT_BUFFER_CAPACITY;
use crate::error::Error;

/// Largest `limit` accepted by `GET /api/v3/depth`
pub const MAX_SNAPSHOT_LIMIT: u32 = 5000;

/// API environment (production or testnet)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Production environment
    #[default]
    Production,
    /// Spot testnet
    Testnet,
}

impl Environment {
    /// Get the base URL for REST API
    pub fn rest_base_url(&self) -> &'static str {
        match self {
            Environment::Production => "https://api.binance.com",
            Environment::Testnet => "https://testnet.binance.vision",
        }
    }

    /// Get the raw-stream WebSocket base URL
    pub fn websocket_url(&self) -> &'static str {
        match self {
            Environment::Production => "wss://stream.binance.com:9443/ws",
            Environment::Testnet => "wss://stream.testnet.binance.vision/ws",
        }
    }
}

/// Push interval of the diff-depth stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateSpeed {
    /// `<symbol>@depth`, one event per second
    #[default]
    Standard,
    /// `<symbol>@depth@100ms`
    Fast,
}

impl UpdateSpeed {
    /// Stream name suffix for this speed
    pub fn stream_suffix(&self) -> &'static str {
        match self {
            UpdateSpeed::Standard => "@depth",
            UpdateSpeed::Fast => "@depth@100ms",
        }
    }
}

/// Configuration for one depth cache
///
/// # Example
///
/// ```rust
/// use binance_depth_cache::Config;
/// use binance_depth_cache::config::{Environment, UpdateSpeed};
///
/// let config = Config::new("ETHBTC");
///
/// // Use testnet with the 100ms stream
/// let testnet = Config::new("BTCUSDT")
///     .with_environment(Environment::Testnet)
///     .with_update_speed(UpdateSpeed::Fast);
///
/// // Custom timeout and snapshot size
/// let config = Config::new("ETHBTC")
///     .with_timeout(std::time::Duration::from_secs(30))
///     .with_snapshot_limit(5000);
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Trading pair, e.g. "ETHBTC"
    symbol: String,

    /// API environment
    environment: Environment,

    /// HTTP request timeout
    timeout: Duration,

    /// Levels per side requested from the REST snapshot
    snapshot_limit: u32,

    /// Diff-depth stream speed
    update_speed: UpdateSpeed,

    /// Out-of-sequence deltas held while waiting for a snapshot
    buffer_capacity: usize,

    /// Backoff for resubscribing and refetching snapshots
    reconnect: ReconnectConfig,
}

impl Config {
    /// Create a configuration for `symbol` with default settings
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            environment: Environment::default(),
            timeout: Duration::from_secs(10),
            snapshot_limit: 1000,
            update_speed: UpdateSpeed::default(),
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            reconnect: ReconnectConfig::default(),
        }
    }

    /// Set the API environment (production or testnet)
    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Set the HTTP request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the number of levels per side fetched in the snapshot (1-5000)
    #[must_use]
    pub fn with_snapshot_limit(mut self, limit: u32) -> Self {
        self.snapshot_limit = limit;
        self
    }

    /// Set the diff-depth stream speed
    #[must_use]
    pub fn with_update_speed(mut self, speed: UpdateSpeed) -> Self {
        self.update_speed = speed;
        self
    }

    /// Set the delta buffer capacity
    #[must_use]
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Set the reconnect / resync backoff
    #[must_use]
    pub fn with_reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Check the settings before any connection is made
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidSymbol`] if the symbol is empty or not alphanumeric
    /// - [`Error::Config`] for a zero buffer capacity or an out-of-range
    ///   snapshot limit
    pub fn validate(&self) -> Result<(), Error> {
        if self.symbol.is_empty() || !self.symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::InvalidSymbol(self.symbol.clone()));
        }
        if self.buffer_capacity == 0 {
            return Err(Error::Config("buffer capacity must be at least 1".into()));
        }
        if !(1..=MAX_SNAPSHOT_LIMIT).contains(&self.snapshot_limit) {
            return Err(Error::Config(format!(
                "snapshot limit {} outside 1..={}",
                self.snapshot_limit, MAX_SNAPSHOT_LIMIT
            )));
        }
        Ok(())
    }

    /// Get the symbol as given
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Get the environment
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Get the REST API base URL
    pub fn rest_base_url(&self) -> &'static str {
        self.environment.rest_base_url()
    }

    /// Get the WebSocket URL
    pub fn websocket_url(&self) -> &'static str {
        self.environment.websocket_url()
    }

    /// Get the timeout duration
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Get the snapshot depth limit
    pub fn snapshot_limit(&self) -> u32 {
        self.snapshot_limit
    }

    /// Get the stream speed
    pub fn update_speed(&self) -> UpdateSpeed {
        self.update_speed
    }

    /// Get the delta buffer capacity
    pub fn buffer_capacity(&self) -> usize {
        self.buffer_capacity
    }

    /// Get the reconnect configuration
    pub fn reconnect(&self) -> &ReconnectConfig {
        &self.reconnect
    }
}
