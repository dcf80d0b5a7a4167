//! Wall detection over ranked order book levels
//!
//! For each side, the top `max_levels` levels are checked against the
//! symbol's notional threshold and the maximum distance from mid. Levels that
//! pass both checks and clear the cooldown cache become [`AlertEvent`]s.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::config::{MonitorConfig, ThresholdConfig};
use crate::orderbook::dedup::AlertDedupCache;
use crate::orderbook::types::{AlertEvent, AlertKey, OrderBookLevel, OrderBookUpdate, RawLevel, Side};

/// Resolves notional thresholds from static configuration
#[derive(Debug, Clone)]
pub struct ThresholdPolicy {
    thresholds: ThresholdConfig,
}

impl ThresholdPolicy {
    pub fn new(thresholds: ThresholdConfig) -> Self {
        Self { thresholds }
    }

    /// USD threshold for `symbol`, falling back to the default
    pub fn threshold(&self, symbol: &str) -> Decimal {
        self.thresholds
            .per_instrument_usd
            .get(symbol)
            .copied()
            .unwrap_or(self.thresholds.default_usd)
    }
}

/// Stateless apart from the shared cooldown cache
pub struct OrderBookScanner {
    policy: ThresholdPolicy,
    max_distance_percent: Decimal,
    max_levels: usize,
    dedup: Arc<AlertDedupCache>,
}

impl OrderBookScanner {
    pub fn new(
        policy: ThresholdPolicy,
        max_distance_percent: Decimal,
        max_levels: usize,
        dedup: Arc<AlertDedupCache>,
    ) -> Self {
        Self {
            policy,
            max_distance_percent,
            max_levels,
            dedup,
        }
    }

    /// Scanner with a fresh cooldown cache sized from `config`
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(
            ThresholdPolicy::new(config.thresholds.clone()),
            config.max_distance_percent,
            config.max_levels_to_scan,
            Arc::new(AlertDedupCache::new(config.alert_cooldown_ms)),
        )
    }

    pub fn policy(&self) -> &ThresholdPolicy {
        &self.policy
    }

    /// Scan both sides of `update` and return the walls allowed to fire
    ///
    /// One-sided books, unparseable top levels and a zero mid yield nothing.
    pub fn scan(&self, update: &OrderBookUpdate, symbol: &str, now_ms: i64) -> Vec<AlertEvent> {
        let Some(mid) = mid_price(update) else {
            return Vec::new();
        };

        let threshold = self.policy.threshold(symbol);
        let mut events = Vec::new();

        self.scan_side(&update.bids, Side::Buy, symbol, mid, threshold, now_ms, &mut events);
        self.scan_side(&update.asks, Side::Sell, symbol, mid, threshold, now_ms, &mut events);

        events
    }

    #[allow(clippy::too_many_arguments)]
    fn scan_side(
        &self,
        levels: &[RawLevel],
        side: Side,
        symbol: &str,
        mid: Decimal,
        threshold: Decimal,
        now_ms: i64,
        events: &mut Vec<AlertEvent>,
    ) {
        // Depth is not monotonic in size: keep going after a small level
        for raw in levels.iter().take(self.max_levels) {
            let Some(level) = OrderBookLevel::parse(raw) else {
                continue;
            };

            let Some(size_usd) = level.notional() else {
                continue;
            };
            if size_usd < threshold {
                continue;
            }

            let Some(distance) = distance_percent(level.price, mid) else {
                continue;
            };
            if distance > self.max_distance_percent {
                continue;
            }

            if self
                .dedup
                .should_alert(AlertKey::new(symbol, side, level.price), now_ms)
            {
                events.push(AlertEvent {
                    symbol: symbol.to_string(),
                    side,
                    price: level.price,
                    size_usd,
                    distance_percent: distance,
                    timestamp: now_ms,
                });
            }
        }
    }
}

/// `(best_bid + best_ask) / 2`, or `None` if either top level is unusable
pub fn mid_price(update: &OrderBookUpdate) -> Option<Decimal> {
    let best_bid = OrderBookLevel::parse(update.bids.first()?)?.price;
    let best_ask = OrderBookLevel::parse(update.asks.first()?)?.price;
    let mid = best_bid.checked_add(best_ask)?.checked_div(Decimal::TWO)?;
    if mid.is_zero() {
        None
    } else {
        Some(mid)
    }
}

/// `|price - mid| / mid * 100`
pub fn distance_percent(price: Decimal, mid: Decimal) -> Option<Decimal> {
    price
        .checked_sub(mid)?
        .abs()
        .checked_div(mid.abs())?
        .checked_mul(Decimal::ONE_HUNDRED)
}
