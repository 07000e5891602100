//! Keeps a [`DepthCache`] synchronized from a snapshot source and a delta
//! source.
//!
//! The loop subscribes to deltas first, then fetches a snapshot while the
//! stream keeps feeding the cache (deltas are buffered until the bootstrap
//! replays them). A sequence gap or a lost stream starts the process over.
//!
//! # Example
//!
//! ```rust,no_run
//! use binance_depth_cache::{BinanceClient, Config};
//!
//! # async fn example() -> binance_depth_cache::Result<()> {
//! let client = BinanceClient::new(Config::new("ETHBTC"))?;
//! let cache = client.depth_cache();
//!
//! client
//!     .maintainer()
//!     .run(&cache, async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use futures_util::StreamExt;
use tracing::{debug, info, warn};

use crate::client::websocket::ReconnectConfig;
use crate::depth::{ApplyStatus, DepthCache};
use crate::error::Error;
use crate::source::{DeltaSource, SnapshotSource};
use crate::types::{DeltaEvent, Snapshot};

/// Why one subscription ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    Shutdown,
    /// Stream lost; `synced` is whether the cache went live on it
    Lost { synced: bool },
}

/// What the loop should do after one stream item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Resync,
    Lost,
}

/// Drives one [`DepthCache`] from a [`SnapshotSource`] and a [`DeltaSource`]
#[derive(Debug, Clone)]
pub struct Maintainer<S, D> {
    snapshots: S,
    deltas: D,
    symbol: String,
    reconnect: ReconnectConfig,
}

impl<S, D> Maintainer<S, D>
where
    S: SnapshotSource + Sync,
    D: DeltaSource + Sync,
{
    /// Create a maintainer for `symbol`
    pub fn new(snapshots: S, deltas: D, symbol: impl Into<String>, reconnect: ReconnectConfig) -> Self {
        Self {
            snapshots,
            deltas,
            symbol: symbol.into(),
            reconnect,
        }
    }

    /// Symbol the maintainer subscribes to
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Run until `shutdown` completes or reconnecting is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] after `max_retries` consecutive
    /// subscriptions that failed or ended before the cache went live.
    pub async fn run<F>(&self, cache: &DepthCache, shutdown: F) -> Result<(), Error>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut failures: u32 = 0;

        loop {
            let subscribed = tokio::select! {
                biased;
                _ = shutdown.as_mut() => return Ok(()),
                result = self.deltas.subscribe(&self.symbol) => result,
            };

            match subscribed {
                Ok(stream) => match self.session(cache, stream, shutdown.as_mut()).await {
                    SessionEnd::Shutdown => return Ok(()),
                    SessionEnd::Lost { synced } => {
                        cache.invalidate();
                        failures = if synced { 1 } else { failures + 1 };
                        warn!(symbol = %self.symbol, failures, "Delta stream lost");
                    }
                },
                Err(e) => {
                    failures += 1;
                    warn!(symbol = %self.symbol, error = %e, failures, "Subscribe failed");
                }
            }

            if self.reconnect.exhausted(failures) {
                warn!(
                    symbol = %self.symbol,
                    max_retries = self.reconnect.max_retries,
                    "Giving up on delta stream"
                );
                return Err(Error::ConnectionClosed);
            }

            let delay = self.reconnect.delay_for_attempt(failures.saturating_sub(1));
            debug!(symbol = %self.symbol, delay_ms = delay.as_millis() as u64, "Resubscribing");
            tokio::select! {
                biased;
                _ = shutdown.as_mut() => return Ok(()),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Consume one subscription until it ends or shutdown fires
    async fn session<F>(&self, cache: &DepthCache, mut stream: D::Stream, mut shutdown: Pin<&mut F>) -> SessionEnd
    where
        F: Future<Output = ()>,
    {
        let fetch = self.delayed_fetch(Duration::ZERO);
        tokio::pin!(fetch);
        let mut fetching = !cache.is_live();
        let mut attempt: u32 = 0;
        let mut synced = cache.is_live();

        loop {
            tokio::select! {
                biased;
                _ = shutdown.as_mut() => return SessionEnd::Shutdown,
                item = stream.next() => {
                    let flow = match item {
                        Some(item) => self.handle_item(cache, item),
                        None => Flow::Lost,
                    };
                    match flow {
                        Flow::Continue => {}
                        Flow::Lost => return SessionEnd::Lost { synced },
                        Flow::Resync => {
                            if !fetching {
                                attempt = 0;
                                fetch.set(self.delayed_fetch(Duration::ZERO));
                                fetching = true;
                            }
                        }
                    }
                }
                result = &mut fetch, if fetching => {
                    fetching = false;
                    match self.on_snapshot(cache, result) {
                        Ok(()) => {
                            synced = true;
                            attempt = 0;
                        }
                        Err(retry_after) => {
                            let delay = self.reconnect.delay_for_attempt(attempt).max(retry_after);
                            attempt = attempt.saturating_add(1);
                            fetch.set(self.delayed_fetch(delay));
                            fetching = true;
                        }
                    }
                }
            }
        }
    }

    fn handle_item(&self, cache: &DepthCache, item: Result<DeltaEvent, Error>) -> Flow {
        let delta = match item {
            Ok(delta) => delta,
            Err(e) if e.is_decode() => {
                warn!(symbol = %self.symbol, error = %e, "Skipping undecodable delta");
                return Flow::Continue;
            }
            Err(e) => {
                warn!(symbol = %self.symbol, error = %e, "Delta stream error");
                return Flow::Lost;
            }
        };

        match cache.apply(delta) {
            Ok(ApplyStatus::ResyncRequired) => {
                info!(symbol = %self.symbol, "Resynchronizing depth cache");
                Flow::Resync
            }
            Ok(_) => Flow::Continue,
            Err(e) => {
                warn!(symbol = %self.symbol, error = %e, "Skipping invalid delta");
                Flow::Continue
            }
        }
    }

    /// Bootstrap from a fetched snapshot. `Err` carries the minimum wait
    /// before the next fetch.
    fn on_snapshot(&self, cache: &DepthCache, result: Result<Snapshot, Error>) -> Result<(), Duration> {
        let outcome = result.and_then(|snapshot| cache.bootstrap(snapshot));
        match outcome {
            Ok(report) if report.is_live() => {
                info!(
                    symbol = %self.symbol,
                    last_update_id = report.last_update_id,
                    "Depth cache synchronized"
                );
                Ok(())
            }
            Ok(report) => {
                warn!(
                    symbol = %self.symbol,
                    snapshot_id = report.snapshot_update_id,
                    backlog = report.backlog,
                    "Snapshot does not connect to buffered deltas, refetching"
                );
                Err(Duration::ZERO)
            }
            Err(Error::AlreadyLive { .. }) => Ok(()),
            Err(Error::RateLimited { retry_after_ms }) => {
                warn!(symbol = %self.symbol, ?retry_after_ms, "Snapshot fetch rate limited");
                Err(Duration::from_millis(retry_after_ms.unwrap_or_default()))
            }
            Err(e) => {
                warn!(symbol = %self.symbol, error = %e, "Snapshot fetch failed");
                Err(Duration::ZERO)
            }
        }
    }

    async fn delayed_fetch(&self, delay: Duration) -> Result<Snapshot, Error> {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.snapshots.fetch_snapshot(&self.symbol).await
    }
}
