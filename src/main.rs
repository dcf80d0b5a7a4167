use std::sync::Arc;

use lighter_wall_monitor::config::MonitorConfig;
use lighter_wall_monitor::error::MonitorError;
use lighter_wall_monitor::lighter::{instruments_from_listings, LighterClient};
use lighter_wall_monitor::notify::{AlertDispatcher, RateLimiter, TelegramNotifier};
use lighter_wall_monitor::orderbook::{HealthStatus, OrderBookScanner, ShardCoordinator};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

struct Options {
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let options = parse_args(&args);

    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = MonitorConfig::from_env().map_err(MonitorError::from)?;

    tracing::info!(
        api_url = %config.api_url,
        ws_url = %config.ws_url,
        schema = %config.ws_schema,
        "Starting Lighter wall monitor"
    );

    run(config, options).await
}

/// Parse command-line arguments
fn parse_args(args: &[String]) -> Options {
    let mut options = Options { dry_run: false };

    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--dry-run" => options.dry_run = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                std::process::exit(1);
            }
        }
    }

    options
}

/// Print usage information
fn print_usage() {
    println!("Lighter Wall Monitor - large resting order alerts for Lighter perpetuals");
    println!();
    println!("USAGE:");
    println!("    lighter-wall-monitor [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --dry-run           Log alerts only, never send Telegram messages");
    println!("    --help, -h          Print this help message");
    println!();
    println!("ENVIRONMENT VARIABLES:");
    println!("    LIGHTER_API_URL             REST base URL (default: https://explorer.elliot.ai)");
    println!("    LIGHTER_WS_URL              Stream URL (default depends on schema)");
    println!("    LIGHTER_WS_SCHEMA           nested or flat (default: nested)");
    println!("    WALL_DEFAULT_THRESHOLD_USD  Threshold for unlisted symbols (default: 500000)");
    println!("    WALL_THRESHOLDS_USD         Overrides, e.g. BTC=30000000,ETH=20000000");
    println!("    WALL_MAX_DISTANCE_PERCENT   Max distance from mid (default: 3)");
    println!("    ALERT_COOLDOWN_MS           Per-level cooldown (default: 300000)");
    println!("    MAX_LEVELS_TO_SCAN          Depth cap per side (default: 50)");
    println!("    MAX_SUBS_PER_SOCKET         Subscriptions per connection (default: 100)");
    println!("    RECONNECT_DELAY_MS          Fixed reconnect delay (default: 5000)");
    println!("    SHARD_STAGGER_MS            Delay between shard starts (default: 1500)");
    println!("    KEEPALIVE_INTERVAL_SECS     Ping interval (default: 20)");
    println!("    EXCLUDED_SYMBOL_SUFFIXES    Comma separated (default: /USDC)");
    println!("    HEALTH_LOG_INTERVAL_SECS    Health summary interval (default: 60)");
    println!("    TELEGRAM_ENABLED            true/false (default: true)");
    println!("    TELEGRAM_BOT_TOKEN          Bot token (notifications off when unset)");
    println!("    TELEGRAM_CHAT_ID            Target chat id");
    println!("    TELEGRAM_MAX_PER_MINUTE     Delivery quota (default: 20)");
    println!("    RUST_LOG                    Logging level (default: info)");
}

async fn run(config: MonitorConfig, options: Options) -> anyhow::Result<()> {
    let client = LighterClient::new(config.api_url.clone()).map_err(MonitorError::from)?;
    let listings = client.get_markets().await.map_err(MonitorError::from)?;
    let instruments = instruments_from_listings(listings, &config.excluded_suffixes);

    if instruments.is_empty() {
        return Err(MonitorError::Initialization("No markets left to monitor".to_string()).into());
    }
    tracing::info!(markets = instruments.len(), "Markets selected for monitoring");

    let notifier = match config.notify.active_credentials() {
        Some(_) if options.dry_run => {
            tracing::info!("Dry run: Telegram delivery disabled");
            None
        }
        Some(credentials) => {
            tracing::info!(chat_id = %credentials.chat_id, "Telegram delivery enabled");
            Some(TelegramNotifier::new(credentials.clone()).map_err(MonitorError::from)?)
        }
        None => {
            tracing::warn!("Telegram credentials not configured - alerts will only be logged");
            None
        }
    };
    let dispatcher =
        AlertDispatcher::new(notifier, RateLimiter::per_minute(config.notify.max_per_minute));

    let (alert_tx, alert_rx) = mpsc::unbounded_channel();
    let scanner = Arc::new(OrderBookScanner::from_config(&config));
    let coordinator = ShardCoordinator::new(&instruments, &config, scanner, alert_tx);
    tracing::info!(shards = coordinator.shard_count(), "Shards planned");

    let cancel = CancellationToken::new();

    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Received shutdown signal (Ctrl+C)");
                signal_cancel.cancel();
            }
            Err(err) => {
                tracing::error!("Failed to listen for shutdown signal: {}", err);
            }
        }
    });

    let dispatcher_handle = dispatcher.start(alert_rx, cancel.child_token());
    let shard_handles = coordinator.start(&cancel).await;

    let mut health_interval = tokio::time::interval(config.health_log_interval);
    health_interval.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = health_interval.tick() => {
                let health = coordinator.health(chrono::Utc::now().timestamp_millis());
                let reason = health.reason.as_deref().unwrap_or("-");
                match health.status {
                    HealthStatus::Ok => tracing::info!(
                        status = health.status.as_str(),
                        connected = health.shards_connected,
                        shards = health.shards_total,
                        book_updates = health.book_updates,
                        alerts = health.alerts_emitted,
                        reconnects = health.reconnects,
                        "Monitor health"
                    ),
                    HealthStatus::Degraded | HealthStatus::Error => tracing::warn!(
                        status = health.status.as_str(),
                        connected = health.shards_connected,
                        shards = health.shards_total,
                        reconnects = health.reconnects,
                        reason,
                        "Monitor health"
                    ),
                }
            }
        }
    }

    tracing::info!("Shutting down shards...");
    futures::future::join_all(shard_handles).await;
    // Shards held the last alert senders
    drop(coordinator);
    if let Err(e) = dispatcher_handle.await {
        tracing::error!("Alert dispatcher task failed: {}", e);
    }

    tracing::info!("Monitor stopped");
    Ok(())
}
