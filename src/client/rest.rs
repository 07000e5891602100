//! HTTP REST client for the Binance market data API.
//!
//! This module provides the [`RestClient`] used to fetch the order book
//! snapshot that bootstraps a depth cache. Only public market data
//! endpoints are used, so requests are unsigned.
//!
//! # Example
//!
//! ```rust,no_run
//! use binance_depth_cache::client::RestClient;
//! use binance_depth_cache::Config;
//!
//! # async fn example() -> binance_depth_cache::Result<()> {
//! let config = Config::new("ETHBTC");
//! let rest = RestClient::new(&config)?;
//!
//! let depth = rest.get_depth("ETHBTC", 100).await?;
//! println!("{} bids at update {}", depth.bids.len(), depth.last_update_id);
//! # Ok(())
//! # }
//! ```

use std::future::Future;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use url::Url;

use crate::config::Config;
use crate::error::{ApiError, Error};
use crate::source::SnapshotSource;
use crate::types::messages::{ApiErrorMsg, DepthSnapshotMsg};
use crate::types::Snapshot;

/// Order book endpoint
const DEPTH_PATH: &str = "/api/v3/depth";

/// HTTP client for the Binance REST API
#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    base_url: Url,
    snapshot_limit: u32,
}

impl RestClient {
    /// Create a new REST client
    ///
    /// # Arguments
    ///
    /// * `config` - Client configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client
    /// cannot be initialized.
    pub fn new(config: &Config) -> Result<Self, Error> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        let base_url = Url::parse(config.rest_base_url())?;

        Ok(Self {
            client,
            base_url,
            snapshot_limit: config.snapshot_limit(),
        })
    }

    /// Make a GET request to the API
    ///
    /// # Arguments
    ///
    /// * `path` - API path (without base URL)
    /// * `query` - Query string parameters
    ///
    /// # Returns
    ///
    /// Deserialized response body
    pub async fn get<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T, Error>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut url = self.base_url.join(path)?;
        url.query_pairs_mut().extend_pairs(query);

        tracing::debug!(url = %url, "GET request");
        let response = self.client.get(url).send().await?;

        self.handle_response(response).await
    }

    /// Fetch the order book for `symbol` with up to `limit` levels per side
    ///
    /// `GET /api/v3/depth`
    pub async fn get_depth(&self, symbol: &str, limit: u32) -> Result<DepthSnapshotMsg, Error> {
        let query = [
            ("symbol", symbol.to_ascii_uppercase()),
            ("limit", limit.to_string()),
        ];

        tracing::debug!(symbol = %symbol, limit, "Fetching depth snapshot");
        let depth: DepthSnapshotMsg = self.get(DEPTH_PATH, &query).await?;

        tracing::debug!(
            symbol = %symbol,
            last_update_id = depth.last_update_id,
            bid_levels = depth.bids.len(),
            ask_levels = depth.asks.len(),
            "Depth snapshot received"
        );
        Ok(depth)
    }

    /// Handle the HTTP response, checking for errors
    async fn handle_response<T>(&self, response: reqwest::Response) -> Result<T, Error>
    where
        T: serde::de::DeserializeOwned,
    {
        let status = response.status();

        if let Some(err) = rate_limit_error(status, response.headers()) {
            return Err(err);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            if let Ok(api_error) = serde_json::from_str::<ApiErrorMsg>(&body) {
                return Err(Error::Api(ApiError::with_code(
                    status.as_u16(),
                    api_error.code,
                    api_error.msg,
                )));
            }

            return Err(Error::Api(ApiError::new(status.as_u16(), body)));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(Error::from)
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }
}

/// Map 429 (request weight exceeded) and 418 (IP auto-banned after ignoring
/// 429s) to [`Error::RateLimited`], reading `Retry-After` in seconds
fn rate_limit_error(status: StatusCode, headers: &HeaderMap) -> Option<Error> {
    if status != StatusCode::TOO_MANY_REQUESTS && status != StatusCode::IM_A_TEAPOT {
        return None;
    }

    let retry_after_ms = headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(|secs| secs.saturating_mul(1000));

    Some(Error::RateLimited { retry_after_ms })
}

impl SnapshotSource for RestClient {
    fn fetch_snapshot(&self, symbol: &str) -> impl Future<Output = Result<Snapshot, Error>> + Send {
        async move {
            let depth = self.get_depth(symbol, self.snapshot_limit).await?;
            Ok(Snapshot::from(depth))
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Config(format!("invalid URL: {}", err))
    }
}
