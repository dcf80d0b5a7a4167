//! One streaming connection for a fixed subset of markets
//!
//! The shard runs forever: connect, subscribe every assigned market, stream
//! and scan frames, and on any close or error wait a fixed delay and start
//! over with the same assignment.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, timeout, Instant, MissedTickBehavior};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::config::MonitorConfig;
use crate::orderbook::health::ShardStats;
use crate::orderbook::scanner::OrderBookScanner;
use crate::orderbook::types::{AlertEvent, InstrumentTable, OrderBookUpdate, ShardAssignment};
use crate::orderbook::websocket::{InboundFrame, WireSchema};

/// Upper bound on TCP connect plus websocket handshake
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection parameters shared by every shard
#[derive(Debug, Clone)]
pub struct ShardSettings {
    pub ws_url: String,
    pub schema: WireSchema,
    pub keepalive_interval: Duration,
    pub reconnect_delay: Duration,
    pub connect_timeout: Duration,
}

impl ShardSettings {
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self {
            ws_url: config.ws_url.clone(),
            schema: config.ws_schema,
            keepalive_interval: config.keepalive_interval,
            reconnect_delay: config.reconnect_delay,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

/// Connection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShardState {
    Connecting,
    Subscribed,
    Streaming,
    Closed,
}

/// How a streaming session ended without a transport error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Close frame received, with its status code if any
    Closed(Option<u16>),
    /// Stream ended without a close frame
    StreamEnded,
}

impl fmt::Display for SessionEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEnd::Closed(Some(code)) => write!(f, "closed by peer (code {})", code),
            SessionEnd::Closed(None) => f.write_str("closed by peer"),
            SessionEnd::StreamEnded => f.write_str("stream ended"),
        }
    }
}

pub struct ConnectionShard {
    assignment: ShardAssignment,
    settings: ShardSettings,
    instruments: Arc<InstrumentTable>,
    scanner: Arc<OrderBookScanner>,
    alert_tx: mpsc::UnboundedSender<AlertEvent>,
    stats: Arc<ShardStats>,
    state: ShardState,
}

impl ConnectionShard {
    pub fn new(
        assignment: ShardAssignment,
        settings: ShardSettings,
        instruments: Arc<InstrumentTable>,
        scanner: Arc<OrderBookScanner>,
        alert_tx: mpsc::UnboundedSender<AlertEvent>,
        stats: Arc<ShardStats>,
    ) -> Self {
        Self {
            assignment,
            settings,
            instruments,
            scanner,
            alert_tx,
            stats,
            state: ShardState::Closed,
        }
    }

    pub fn shard_id(&self) -> usize {
        self.assignment.shard_id
    }

    pub fn state(&self) -> ShardState {
        self.state
    }

    /// Spawn the reconnect loop as a background task
    pub fn start(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }

    /// Reconnect loop; returns only when `cancel` fires
    pub async fn run(mut self, cancel: CancellationToken) {
        let shard_id = self.shard_id();
        loop {
            self.transition(ShardState::Connecting);

            let outcome = tokio::select! {
                _ = cancel.cancelled() => {
                    info!(shard_id, "Shard cancelled");
                    return;
                }
                outcome = self.run_session() => outcome,
            };

            // Keepalive ticker was owned by the session and is gone by now
            self.stats.record_disconnected();
            self.transition(ShardState::Closed);

            let delay_ms = self.settings.reconnect_delay.as_millis() as u64;
            match outcome {
                Ok(end) => info!(
                    shard_id,
                    reason = %end,
                    delay_ms,
                    "WebSocket connection closed, reconnecting"
                ),
                Err(e) => warn!(
                    shard_id,
                    error = %format!("{:#}", e),
                    delay_ms,
                    "WebSocket connection failed, reconnecting"
                ),
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!(shard_id, "Shard cancelled during reconnect delay");
                    return;
                }
                _ = sleep(self.settings.reconnect_delay) => {}
            }
        }
    }

    fn transition(&mut self, next: ShardState) {
        trace!(shard_id = self.shard_id(), from = ?self.state, to = ?next, "Shard state change");
        self.state = next;
    }

    /// Connect, subscribe and stream until the connection terminates
    async fn run_session(&mut self) -> Result<SessionEnd> {
        info!(
            shard_id = self.shard_id(),
            url = %self.settings.ws_url,
            markets = self.assignment.instruments.len(),
            "Connecting to Lighter order book stream"
        );

        let (ws_stream, _) = timeout(
            self.settings.connect_timeout,
            connect_async(self.settings.ws_url.as_str()),
        )
        .await
        .with_context(|| {
            format!(
                "Timed out connecting to {} after {:?}",
                self.settings.ws_url, self.settings.connect_timeout
            )
        })?
        .with_context(|| format!("Failed to connect to {}", self.settings.ws_url))?;
        self.stats.record_connected();

        let (mut write, mut read) = ws_stream.split();

        for instrument in &self.assignment.instruments {
            let frame = self.settings.schema.subscribe_frame(instrument.id);
            write
                .send(Message::Text(frame.into()))
                .await
                .with_context(|| format!("Failed to subscribe market {}", instrument.id))?;
        }
        self.transition(ShardState::Subscribed);
        info!(
            shard_id = self.shard_id(),
            markets = self.assignment.instruments.len(),
            "Connection open, subscriptions sent"
        );

        let period = self.settings.keepalive_interval;
        let mut keepalive = interval_at(Instant::now() + period, period);
        keepalive.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.transition(ShardState::Streaming);

        loop {
            tokio::select! {
                msg = read.next() => match msg {
                    Some(Ok(Message::Text(text))) => {
                        let now_ms = chrono::Utc::now().timestamp_millis();
                        self.handle_text(text.as_str(), now_ms);
                    }
                    Some(Ok(Message::Ping(data))) => {
                        write
                            .send(Message::Pong(data))
                            .await
                            .context("Failed to send pong")?;
                    }
                    Some(Ok(Message::Pong(_))) => {
                        trace!(shard_id = self.shard_id(), "Received pong");
                    }
                    Some(Ok(Message::Close(frame))) => {
                        return Ok(SessionEnd::Closed(frame.map(|f| u16::from(f.code))));
                    }
                    Some(Ok(Message::Binary(_))) => {
                        debug!(shard_id = self.shard_id(), "Ignoring binary frame");
                    }
                    Some(Ok(Message::Frame(_))) => {}
                    Some(Err(e)) => return Err(e).context("WebSocket read error"),
                    None => return Ok(SessionEnd::StreamEnded),
                },
                _ = keepalive.tick() => {
                    let frame = self
                        .settings
                        .schema
                        .keepalive_frame(chrono::Utc::now().timestamp_millis());
                    write
                        .send(Message::Text(frame.into()))
                        .await
                        .context("Failed to send keepalive")?;
                    trace!(shard_id = self.shard_id(), "Sent keepalive");
                }
            }
        }
    }

    /// Decode and route one text frame; never fails
    pub fn handle_text(&self, text: &str, now_ms: i64) {
        self.stats.record_frame(now_ms);

        match self.settings.schema.decode(text) {
            InboundFrame::OrderBook(update) => self.handle_book(&update, now_ms),
            InboundFrame::SubscriptionAck => {
                debug!(shard_id = self.shard_id(), "Subscription acknowledged");
            }
            InboundFrame::KeepaliveAck => {
                trace!(shard_id = self.shard_id(), "Keepalive acknowledged");
            }
            InboundFrame::Unknown => {
                debug!(shard_id = self.shard_id(), len = text.len(), "Ignoring unrecognised frame");
            }
        }
    }

    fn handle_book(&self, update: &OrderBookUpdate, now_ms: i64) {
        let Some(symbol) = self.instruments.symbol(update.instrument_id) else {
            debug!(
                shard_id = self.shard_id(),
                market_id = update.instrument_id,
                "Order book for unknown market, ignoring"
            );
            return;
        };
        self.stats.record_book_update();

        if !update.is_two_sided() {
            return;
        }

        let events = self.scanner.scan(update, symbol, now_ms);
        self.stats.record_alerts(events.len());

        for event in events {
            if self.alert_tx.send(event).is_err() {
                warn!(shard_id = self.shard_id(), "Alert receiver dropped, alert discarded");
            }
        }
    }
}
