// Unit tests for environment configuration loading

use std::collections::HashMap;
use std::time::Duration;

use lighter_wall_monitor::config::{ConfigError, MonitorConfig};
use lighter_wall_monitor::orderbook::WireSchema;

fn load(pairs: &[(&str, &str)]) -> Result<MonitorConfig, ConfigError> {
    let env: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    MonitorConfig::from_lookup(|key| env.get(key).cloned())
}

#[test]
fn test_flat_schema_switches_default_endpoint() {
    let config = load(&[("LIGHTER_WS_SCHEMA", "flat")]).unwrap();
    assert_eq!(config.ws_schema, WireSchema::Flat);
    assert_eq!(config.ws_url, "wss://mainnet.zklighter.elliot.ai/ws");
}

#[test]
fn test_explicit_ws_url_wins() {
    let config = load(&[
        ("LIGHTER_WS_SCHEMA", "flat"),
        ("LIGHTER_WS_URL", "ws://127.0.0.1:9000"),
    ])
    .unwrap();
    assert_eq!(config.ws_url, "ws://127.0.0.1:9000");
}

#[test]
fn test_timing_variables() {
    let config = load(&[
        ("RECONNECT_DELAY_MS", "250"),
        ("SHARD_STAGGER_MS", "1000"),
        ("HEALTH_LOG_INTERVAL_SECS", "5"),
    ])
    .unwrap();
    assert_eq!(config.reconnect_delay, Duration::from_millis(250));
    assert_eq!(config.shard_stagger, Duration::from_secs(1));
    assert_eq!(config.health_log_interval, Duration::from_secs(5));
}

#[test]
fn test_error_names_variable() {
    let err = load(&[("MAX_LEVELS_TO_SCAN", "lots")]).unwrap_err();
    assert!(err.to_string().starts_with("MAX_LEVELS_TO_SCAN"));

    let err = load(&[("MAX_SUBS_PER_SOCKET", "0")]).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { var: "MAX_SUBS_PER_SOCKET", .. }));
}

#[test]
fn test_telegram_disabled_flag_hides_credentials() {
    let config = load(&[
        ("TELEGRAM_BOT_TOKEN", "123456:secret-token"),
        ("TELEGRAM_CHAT_ID", "-100"),
        ("TELEGRAM_ENABLED", "false"),
    ])
    .unwrap();
    assert!(config.notify.telegram.is_some());
    assert!(config.notify.active_credentials().is_none());
    assert!(!format!("{:?}", config).contains("secret-token"));
}
