//! Lighter HTTP Client
//!
//! Thin reqwest wrapper with timeout, user-agent and 429 retry handling.

use std::time::Duration;

use reqwest::Client;
use tracing::{info, warn};

use crate::error::VenueError;
use crate::lighter::types::MarketListing;

const USER_AGENT: &str = concat!("lighter-wall-monitor/", env!("CARGO_PKG_VERSION"));
const MAX_RETRIES: u32 = 3;

/// Lighter REST API HTTP client
#[derive(Debug, Clone)]
pub struct LighterClient {
    client: Client,
    base_url: String,
}

impl LighterClient {
    /// Client with a 10 second timeout
    pub fn new(base_url: impl Into<String>) -> Result<Self, VenueError> {
        Self::with_timeout(base_url, Duration::from_secs(10))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, VenueError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| VenueError::InternalError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches every listed market
    ///
    /// Calls GET /api/markets. HTTP 429 is retried up to 3 times, honoring
    /// `Retry-After` when present and backing off 1s, 2s, 4s otherwise.
    ///
    /// # Errors
    /// * `ConnectionError` - Network failures, timeouts, 5xx server errors
    /// * `RateLimitError` - HTTP 429 after max retries
    /// * `ParseError` - Response is not a JSON array of listings
    pub async fn get_markets(&self) -> Result<Vec<MarketListing>, VenueError> {
        let url = format!("{}/api/markets", self.base_url);
        let mut retry_count = 0;

        loop {
            let resp = self.client.get(&url).send().await?;
            let status = resp.status();

            if status.as_u16() == 429 {
                if retry_count >= MAX_RETRIES {
                    return Err(VenueError::RateLimitError(format!(
                        "Market listing rate limited after {} retries",
                        MAX_RETRIES
                    )));
                }

                let retry_after = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|h| h.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or_else(|| 2_u64.pow(retry_count));

                warn!(
                    "Rate limit hit (429). Retry {} of {}. Waiting {}s before retry.",
                    retry_count + 1,
                    MAX_RETRIES,
                    retry_after
                );

                tokio::time::sleep(Duration::from_secs(retry_after)).await;
                retry_count += 1;
                continue;
            }

            let resp = resp.error_for_status()?;
            let body = resp.text().await?;
            let listings: Vec<MarketListing> = serde_json::from_str(&body)?;

            info!(count = listings.len(), "Fetched market listings");
            return Ok(listings);
        }
    }
}
