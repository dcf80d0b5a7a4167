// End-to-end shard behavior: subscribe, scan, alert, keepalive, reconnect
//
// Each test runs a throwaway tokio-tungstenite server on an ephemeral port
// and drives a real ConnectionShard against it.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use lighter_wall_monitor::config::ThresholdConfig;
use lighter_wall_monitor::orderbook::{
    AlertDedupCache, AlertEvent, ConnectionShard, Instrument, InstrumentTable, OrderBookScanner,
    ShardAssignment, ShardSettings, ShardStats, Side, ThresholdPolicy, WireSchema,
};
use rust_decimal::Decimal;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use tokio_util::sync::CancellationToken;

const WAIT: Duration = Duration::from_secs(5);

struct Harness {
    listener: TcpListener,
    alerts: mpsc::UnboundedReceiver<AlertEvent>,
    stats: Arc<ShardStats>,
    cancel: CancellationToken,
    handle: tokio::task::JoinHandle<()>,
}

async fn start_shard(schema: WireSchema, keepalive: Duration) -> Harness {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let instruments = vec![Instrument::new(1, "ETH"), Instrument::new(2, "SOL")];
    let scanner = OrderBookScanner::new(
        ThresholdPolicy::new(ThresholdConfig::new(Decimal::from(500))),
        Decimal::from(3),
        50,
        Arc::new(AlertDedupCache::new(300_000)),
    );
    let (alert_tx, alerts) = mpsc::unbounded_channel();
    let stats = Arc::new(ShardStats::new());

    let shard = ConnectionShard::new(
        ShardAssignment {
            shard_id: 1,
            instruments: instruments.clone(),
        },
        ShardSettings {
            ws_url: format!("ws://{}", addr),
            schema,
            keepalive_interval: keepalive,
            reconnect_delay: Duration::from_millis(50),
            connect_timeout: Duration::from_millis(300),
        },
        Arc::new(InstrumentTable::new(&instruments)),
        Arc::new(scanner),
        alert_tx,
        Arc::clone(&stats),
    );

    let cancel = CancellationToken::new();
    let handle = shard.start(cancel.clone());

    Harness {
        listener,
        alerts,
        stats,
        cancel,
        handle,
    }
}

impl Harness {
    async fn accept(&self) -> WebSocketStream<TcpStream> {
        let (stream, _) = timeout(WAIT, self.listener.accept())
            .await
            .expect("shard did not connect")
            .unwrap();
        tokio_tungstenite::accept_async(stream).await.unwrap()
    }

    async fn stop(self) {
        self.cancel.cancel();
        timeout(WAIT, self.handle)
            .await
            .expect("shard did not stop")
            .expect("shard panicked");
    }
}

async fn next_text(ws: &mut WebSocketStream<TcpStream>) -> serde_json::Value {
    loop {
        let msg = timeout(WAIT, ws.next())
            .await
            .expect("no frame from shard")
            .expect("stream ended")
            .unwrap();
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

async fn send(ws: &mut WebSocketStream<TcpStream>, json: &str) {
    ws.send(Message::Text(json.to_string().into())).await.unwrap();
}

#[tokio::test]
async fn test_subscribes_every_assigned_market() {
    let harness = start_shard(WireSchema::Nested, Duration::from_secs(60)).await;
    let mut ws = harness.accept().await;

    let first = next_text(&mut ws).await;
    let second = next_text(&mut ws).await;
    assert_eq!(first["type"], "subscribe");
    assert_eq!(first["channel"], "order_book/1");
    assert_eq!(second["channel"], "order_book/2");

    harness.stop().await;
}

#[tokio::test]
async fn test_book_update_produces_alert() {
    let mut harness = start_shard(WireSchema::Nested, Duration::from_secs(60)).await;
    let mut ws = harness.accept().await;
    next_text(&mut ws).await;
    next_text(&mut ws).await;

    send(
        &mut ws,
        r#"{"channel":"order_book:2","type":"update/order_book","order_book":{
            "bids":[{"price":"100","size":"10"}],
            "asks":[{"price":"101","size":"1"}]}}"#,
    )
    .await;

    let event = timeout(WAIT, harness.alerts.recv())
        .await
        .expect("no alert")
        .unwrap();
    assert_eq!(event.symbol, "SOL");
    assert_eq!(event.side, Side::Buy);
    assert_eq!(event.price, Decimal::from(100));

    harness.stop().await;
}

#[tokio::test]
async fn test_unknown_market_and_garbage_do_not_break_stream() {
    let mut harness = start_shard(WireSchema::Flat, Duration::from_secs(60)).await;
    let mut ws = harness.accept().await;
    let sub = next_text(&mut ws).await;
    assert_eq!(sub["channel"], "orderbook");
    assert_eq!(sub["market_id"], 1);
    next_text(&mut ws).await;

    send(
        &mut ws,
        r#"{"channel":"orderbook","market_id":77,
            "bids":[{"price":"100","amount":"10"}],"asks":[{"price":"101","amount":"1"}]}"#,
    )
    .await;
    send(&mut ws, "not json at all").await;
    send(
        &mut ws,
        r#"{"channel":"orderbook","market_id":1,
            "bids":[{"price":"100","amount":"1"}],"asks":[{"price":"101","amount":"10"}]}"#,
    )
    .await;

    let event = timeout(WAIT, harness.alerts.recv())
        .await
        .expect("no alert")
        .unwrap();
    assert_eq!(event.symbol, "ETH");
    assert_eq!(event.side, Side::Sell);
    assert!(harness.alerts.try_recv().is_err());
    assert_eq!(harness.stats.snapshot().book_updates, 1);

    harness.stop().await;
}

#[tokio::test]
async fn test_keepalive_sent_on_interval() {
    let harness = start_shard(WireSchema::Nested, Duration::from_millis(100)).await;
    let mut ws = harness.accept().await;
    next_text(&mut ws).await;
    next_text(&mut ws).await;

    let ping = next_text(&mut ws).await;
    assert_eq!(ping["method"], "PING");
    assert!(ping["id"].is_i64());

    harness.stop().await;
}

#[tokio::test]
async fn test_reconnects_and_resubscribes_after_close() {
    let harness = start_shard(WireSchema::Nested, Duration::from_secs(60)).await;

    let mut ws = harness.accept().await;
    next_text(&mut ws).await;
    next_text(&mut ws).await;
    ws.close(None).await.unwrap();
    drop(ws);

    let mut ws = harness.accept().await;
    let resub = next_text(&mut ws).await;
    assert_eq!(resub["channel"], "order_book/1");
    next_text(&mut ws).await;

    let snap = harness.stats.snapshot();
    assert_eq!(snap.connects, 2);
    assert!(snap.disconnects >= 1);

    harness.stop().await;
}

#[tokio::test]
async fn test_stalled_handshake_times_out_and_retries() {
    let harness = start_shard(WireSchema::Nested, Duration::from_secs(60)).await;

    // Accept the TCP connection but never answer the websocket upgrade
    let (stalled, _) = timeout(WAIT, harness.listener.accept())
        .await
        .expect("shard did not connect")
        .unwrap();

    let mut ws = harness.accept().await;
    let sub = next_text(&mut ws).await;
    assert_eq!(sub["channel"], "order_book/1");

    let snap = harness.stats.snapshot();
    assert_eq!(snap.connects, 1);

    drop(stalled);
    harness.stop().await;
}
