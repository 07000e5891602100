//! # binance-depth-cache
//!
//! A local replica of a [Binance](https://www.binance.com) spot order book,
//! kept in sync from a REST snapshot and the diff-depth WebSocket stream.
//!
//! ## Features
//!
//! - **Depth Cache** - Both sides of the book behind one lock, exact decimal prices
//! - **Sequencing** - Stale deltas dropped, gaps detected, out-of-order deltas buffered and replayed
//! - **Maintainer** - Async loop that bootstraps, resynchronizes and resubscribes
//! - **Pluggable Sources** - Snapshot and delta feeds are traits, so tests and other venues plug in
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use binance_depth_cache::{BinanceClient, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), binance_depth_cache::Error> {
//!     let client = BinanceClient::new(Config::new("ETHBTC"))?;
//!     let cache = Arc::new(client.depth_cache());
//!
//!     let maintainer = client.maintainer();
//!     let reader = Arc::clone(&cache);
//!     tokio::spawn(async move {
//!         maintainer.run(&cache, std::future::pending()).await
//!     });
//!
//!     tokio::time::sleep(std::time::Duration::from_secs(5)).await;
//!     let top = reader.best_bid_ask();
//!     println!("bid {:?} ask {:?}", top.bid, top.ask);
//!     Ok(())
//! }
//! ```
//!
//! ## Synchronization
//!
//! With `S` the last applied update id, a delta `[U, u]` is:
//!
//! - stale if `u <= S` and dropped
//! - ready if `U <= S + 1 <= u` and applied
//! - a gap if `U > S + 1`, which marks the cache stale until a new snapshot
//!
//! ## Architecture
//!
//! - [`depth`] - The cache, its per-side level maps, sequencer and views
//! - [`source`] - Snapshot and delta source traits
//! - [`maintainer`] - The synchronization loop
//! - [`client`] - Binance REST and WebSocket implementations of the sources
//! - [`types`] - Price levels, snapshots, deltas and wire messages
//! - [`config`] - Configuration
//! - [`error`] - Error types for the crate

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod depth;
pub mod error;
pub mod maintainer;
pub mod source;
pub mod types;

// Re-export main types at crate root for convenience
pub use config::Config;
pub use depth::DepthCache;
pub use error::Error;
pub use maintainer::Maintainer;

/// Result type alias using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Maintainer wired to the Binance REST and WebSocket clients
pub type BinanceMaintainer = Maintainer<client::RestClient, client::DepthStreamClient>;

/// The main Binance depth client
///
/// Bundles the configuration with both clients, and builds caches and
/// maintainers that use them.
///
/// # Example
///
/// ```rust,no_run
/// use binance_depth_cache::{BinanceClient, Config};
///
/// # async fn example() -> binance_depth_cache::Result<()> {
/// let client = BinanceClient::new(Config::new("ETHBTC"))?;
///
/// // One-off snapshot
/// let depth = client.rest().get_depth("ETHBTC", 10).await?;
/// println!("update {}", depth.last_update_id);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BinanceClient {
    config: Config,
    rest_client: client::RestClient,
    stream_client: client::DepthStreamClient,
}

impl BinanceClient {
    /// Create a new client with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be initialized.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let rest_client = client::RestClient::new(&config)?;
        let stream_client = client::DepthStreamClient::new(&config)?;
        Ok(Self {
            config,
            rest_client,
            stream_client,
        })
    }

    /// Get a reference to the REST client
    pub fn rest(&self) -> &client::RestClient {
        &self.rest_client
    }

    /// Get a reference to the WebSocket client
    pub fn stream(&self) -> &client::DepthStreamClient {
        &self.stream_client
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Empty cache for the configured symbol and buffer capacity
    pub fn depth_cache(&self) -> DepthCache {
        DepthCache::with_capacity(
            self.config.symbol().to_ascii_uppercase(),
            self.config.buffer_capacity(),
        )
    }

    /// Maintainer driving a cache from both clients
    pub fn maintainer(&self) -> BinanceMaintainer {
        Maintainer::new(
            self.rest_client.clone(),
            self.stream_client.clone(),
            self.config.symbol(),
            self.config.reconnect().clone(),
        )
    }
}
