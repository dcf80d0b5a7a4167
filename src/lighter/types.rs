//! Lighter API Type Definitions

use serde::Deserialize;
use tracing::debug;

use crate::orderbook::types::Instrument;

/// One entry of `GET /api/markets`
///
/// # Example Response
/// ```json
/// [{"symbol": "ETH", "market_index": 0, "status": "active"}]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MarketListing {
    pub symbol: String,
    pub market_index: u32,
}

impl MarketListing {
    /// True if the symbol ends with any of `suffixes`
    pub fn is_excluded(&self, suffixes: &[String]) -> bool {
        suffixes
            .iter()
            .any(|suffix| !suffix.is_empty() && self.symbol.ends_with(suffix.as_str()))
    }
}

/// Listings to monitor, in venue order
///
/// Excluded suffixes and duplicate market indexes (first wins) are dropped.
pub fn instruments_from_listings(
    listings: Vec<MarketListing>,
    excluded_suffixes: &[String],
) -> Vec<Instrument> {
    let mut seen = std::collections::HashSet::new();
    listings
        .into_iter()
        .filter(|listing| {
            if listing.is_excluded(excluded_suffixes) {
                debug!(symbol = %listing.symbol, "Skipping excluded market");
                return false;
            }
            seen.insert(listing.market_index)
        })
        .map(|listing| Instrument::new(listing.market_index, listing.symbol))
        .collect()
}
