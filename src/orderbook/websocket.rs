//! Wire codec for Lighter order book streams
//!
//! Two schema versions are in the wild:
//! - `nested` (`/stream`): `{"channel": "order_book:12", "order_book": {"bids": [...], "asks": [...]}}`
//!   with `{price, size}` levels
//! - `flat` (`/ws`): `{"channel": "orderbook", "market_id": 12, "bids": [...], "asks": [...]}`
//!   with `{price, amount}` levels
//!
//! Both decode into the same [`InboundFrame`]; everything past this module
//! sees only [`OrderBookUpdate`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::orderbook::types::{OrderBookUpdate, RawLevel};

const NESTED_WS_URL: &str = "wss://mainnet.zklighter.elliot.ai/stream";
const FLAT_WS_URL: &str = "wss://mainnet.zklighter.elliot.ai/ws";

/// Stream protocol version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireSchema {
    Nested,
    Flat,
}

impl WireSchema {
    pub fn as_str(&self) -> &'static str {
        match self {
            WireSchema::Nested => "nested",
            WireSchema::Flat => "flat",
        }
    }

    /// Endpoint that speaks this schema
    pub fn default_url(&self) -> &'static str {
        match self {
            WireSchema::Nested => NESTED_WS_URL,
            WireSchema::Flat => FLAT_WS_URL,
        }
    }

    /// Subscription request for one market
    pub fn subscribe_frame(&self, market_id: u32) -> String {
        let request = match self {
            WireSchema::Nested => SubscribeRequest {
                kind: "subscribe",
                channel: format!("order_book/{}", market_id),
                market_id: None,
            },
            WireSchema::Flat => SubscribeRequest {
                kind: "subscribe",
                channel: "orderbook".to_string(),
                market_id: Some(market_id),
            },
        };
        // Serializing a struct of strings and integers cannot fail
        serde_json::to_string(&request).unwrap_or_default()
    }

    /// Application-level keepalive
    pub fn keepalive_frame(&self, now_ms: i64) -> String {
        match self {
            WireSchema::Nested => serde_json::json!({ "method": "PING", "id": now_ms }).to_string(),
            WireSchema::Flat => serde_json::json!({ "type": "ping" }).to_string(),
        }
    }

    /// Classify one inbound text frame
    ///
    /// Never fails: anything that is not JSON or not recognised is `Unknown`.
    pub fn decode(&self, text: &str) -> InboundFrame {
        match self {
            WireSchema::Nested => match serde_json::from_str::<NestedFrame>(text) {
                Ok(frame) => frame.into_inbound(),
                Err(_) => InboundFrame::Unknown,
            },
            WireSchema::Flat => match serde_json::from_str::<FlatFrame>(text) {
                Ok(frame) => frame.into_inbound(),
                Err(_) => InboundFrame::Unknown,
            },
        }
    }
}

impl fmt::Display for WireSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WireSchema {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nested" | "v2" => Ok(WireSchema::Nested),
            "flat" | "v1" => Ok(WireSchema::Flat),
            other => Err(format!("unknown wire schema '{}', expected nested or flat", other)),
        }
    }
}

/// Decoded inbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    SubscriptionAck,
    KeepaliveAck,
    OrderBook(OrderBookUpdate),
    Unknown,
}

#[derive(Debug, Serialize)]
struct SubscribeRequest {
    #[serde(rename = "type")]
    kind: &'static str,
    channel: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    market_id: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct NestedFrame {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    order_book: Option<BookSides>,
}

#[derive(Debug, Deserialize)]
struct BookSides {
    #[serde(default)]
    bids: Vec<RawLevel>,
    #[serde(default)]
    asks: Vec<RawLevel>,
}

impl NestedFrame {
    fn into_inbound(self) -> InboundFrame {
        // Subscription acks carry a full snapshot and are scanned like updates
        if let Some(book) = self.order_book {
            return match self.channel.as_deref().and_then(channel_market_id) {
                Some(instrument_id) => InboundFrame::OrderBook(OrderBookUpdate {
                    instrument_id,
                    bids: book.bids,
                    asks: book.asks,
                }),
                None => InboundFrame::Unknown,
            };
        }
        classify_control(self.kind.as_deref(), self.method.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct FlatFrame {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    market_id: Option<u32>,
    #[serde(default)]
    bids: Option<Vec<RawLevel>>,
    #[serde(default)]
    asks: Option<Vec<RawLevel>>,
}

impl FlatFrame {
    fn into_inbound(self) -> InboundFrame {
        if self.channel.as_deref() == Some("orderbook") {
            if let (Some(instrument_id), Some(bids), Some(asks)) =
                (self.market_id, self.bids, self.asks)
            {
                return InboundFrame::OrderBook(OrderBookUpdate {
                    instrument_id,
                    bids,
                    asks,
                });
            }
        }
        classify_control(self.kind.as_deref(), self.method.as_deref())
    }
}

/// Market id from `order_book:12` or `order_book/12`
fn channel_market_id(channel: &str) -> Option<u32> {
    let (_, id) = channel.rsplit_once([':', '/'])?;
    id.parse().ok()
}

fn classify_control(kind: Option<&str>, method: Option<&str>) -> InboundFrame {
    if method.is_some_and(|m| m.eq_ignore_ascii_case("pong")) {
        return InboundFrame::KeepaliveAck;
    }
    match kind {
        Some("pong") | Some("ping") | Some("result") => InboundFrame::KeepaliveAck,
        Some("connected") => InboundFrame::SubscriptionAck,
        Some(k) if k.starts_with("subscribed") => InboundFrame::SubscriptionAck,
        _ => InboundFrame::Unknown,
    }
}
