//! Order book data structures and types
//!
//! Canonical internal representation shared by the wire codec, the scanner
//! and the shard runtime.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

/// A tradable market on the venue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instrument {
    /// Venue market index, used as the subscription channel key
    pub id: u32,
    pub symbol: String,
}

impl Instrument {
    pub fn new(id: u32, symbol: impl Into<String>) -> Self {
        Self {
            id,
            symbol: symbol.into(),
        }
    }
}

/// Write-once id → symbol lookup shared read-only by every shard
#[derive(Debug, Default, Clone)]
pub struct InstrumentTable {
    symbols: HashMap<u32, String>,
}

impl InstrumentTable {
    pub fn new(instruments: &[Instrument]) -> Self {
        Self {
            symbols: instruments
                .iter()
                .map(|i| (i.id, i.symbol.clone()))
                .collect(),
        }
    }

    pub fn symbol(&self, id: u32) -> Option<&str> {
        self.symbols.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Book side that produced a large order (bids → BUY, asks → SELL)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Price level exactly as it arrived on the wire
///
/// Numeric fields are kept as text and parsed per level during the scan, so
/// a single malformed level never invalidates the rest of the update.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawLevel {
    #[serde(default, deserialize_with = "lenient_text")]
    pub price: String,

    #[serde(default, alias = "amount", deserialize_with = "lenient_text")]
    pub size: String,
}

impl RawLevel {
    pub fn new(price: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            price: price.into(),
            size: size.into(),
        }
    }
}

/// Accepts a JSON string or number; anything else becomes an empty string
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        Text(String),
        Number(serde_json::Number),
        Other(serde_json::Value),
    }

    Ok(match Option::<Lenient>::deserialize(deserializer)? {
        Some(Lenient::Text(text)) => text,
        Some(Lenient::Number(number)) => number.to_string(),
        Some(Lenient::Other(_)) | None => String::new(),
    })
}

/// Parses a decimal in plain or scientific notation
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// A parsed price level, alive only for one scan pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBookLevel {
    pub price: Decimal,
    pub size: Decimal,
}

impl OrderBookLevel {
    /// Returns `None` when either field is not numeric
    pub fn parse(raw: &RawLevel) -> Option<Self> {
        Some(Self {
            price: parse_decimal(&raw.price)?,
            size: parse_decimal(&raw.size)?,
        })
    }

    /// Notional value of the level in quote currency, `None` on overflow
    pub fn notional(&self) -> Option<Decimal> {
        self.price.checked_mul(self.size)
    }
}

/// Ranked top-of-book levels for one instrument
///
/// Index 0 is the best price on each side: bids descend, asks ascend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBookUpdate {
    pub instrument_id: u32,
    pub bids: Vec<RawLevel>,
    pub asks: Vec<RawLevel>,
}

impl OrderBookUpdate {
    /// Mid price needs a level on both sides
    pub fn is_two_sided(&self) -> bool {
        !self.bids.is_empty() && !self.asks.is_empty()
    }
}

/// Cooldown slot identity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlertKey {
    pub symbol: String,
    pub side: Side,
    pub price: Decimal,
}

impl AlertKey {
    pub fn new(symbol: &str, side: Side, price: Decimal) -> Self {
        Self {
            symbol: symbol.to_string(),
            side,
            price,
        }
    }
}

/// A detected wall, handed to the notification path
#[derive(Debug, Clone, PartialEq)]
pub struct AlertEvent {
    pub symbol: String,
    pub side: Side,
    pub price: Decimal,
    /// Notional value of the level (price × size)
    pub size_usd: Decimal,
    /// Distance from mid in percent
    pub distance_percent: Decimal,
    /// Detection time (milliseconds since Unix epoch)
    pub timestamp: i64,
}

/// Fixed instrument subset owned by one connection shard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardAssignment {
    /// 1-based shard number
    pub shard_id: usize,
    pub instruments: Vec<Instrument>,
}
