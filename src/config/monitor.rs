//! Monitor Configuration
//!
//! Thresholds, streaming parameters and notification settings.
//!
//! ## Environment Variables
//!
//! - `LIGHTER_API_URL`: REST base URL (default: https://explorer.elliot.ai)
//! - `LIGHTER_WS_URL`: stream URL (default: wss://mainnet.zklighter.elliot.ai/stream)
//! - `LIGHTER_WS_SCHEMA`: `nested` or `flat` (default: nested)
//! - `WALL_DEFAULT_THRESHOLD_USD`: notional threshold for unlisted symbols (default: 500000)
//! - `WALL_THRESHOLDS_USD`: per-symbol overrides, `BTC=30000000,ETH=20000000`
//! - `WALL_MAX_DISTANCE_PERCENT`: max distance from mid (default: 3)
//! - `ALERT_COOLDOWN_MS`: per price level alert cooldown (default: 300000)
//! - `MAX_LEVELS_TO_SCAN`: depth cap per side (default: 50)
//! - `MAX_SUBS_PER_SOCKET`: subscriptions per connection (default: 100)
//! - `RECONNECT_DELAY_MS`: fixed reconnect delay (default: 5000)
//! - `SHARD_STAGGER_MS`: delay between shard startups (default: 1500)
//! - `KEEPALIVE_INTERVAL_SECS`: ping interval (default: 20)
//! - `EXCLUDED_SYMBOL_SUFFIXES`: comma separated (default: /USDC)
//! - `HEALTH_LOG_INTERVAL_SECS`: health summary interval (default: 60)
//! - `TELEGRAM_ENABLED`, `TELEGRAM_BOT_TOKEN`, `TELEGRAM_CHAT_ID`,
//!   `TELEGRAM_MAX_PER_MINUTE` (default: 20)

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;

use super::{ConfigError, TelegramCredentials};
use crate::orderbook::websocket::WireSchema;

const DEFAULT_API_URL: &str = "https://explorer.elliot.ai";
const DEFAULT_WS_URL: &str = "wss://mainnet.zklighter.elliot.ai/stream";

/// Per-symbol overrides used when `WALL_THRESHOLDS_USD` is not set
const DEFAULT_SYMBOL_THRESHOLDS: &[(&str, u64)] = &[
    ("BTC", 30_000_000),
    ("ETH", 20_000_000),
    ("SOL", 10_000_000),
    ("XRP", 10_000_000),
    ("HYPE", 5_000_000),
    ("1000PEPE", 1_000_000),
    ("DOGE", 1_000_000),
    ("PAXG", 10_000_000),
    ("BNB", 10_000_000),
    ("SEI", 5_000_000),
    ("ZEC", 1_000_000),
    ("LTC", 2_000_000),
    ("AAVE", 1_000_000),
    ("NEAR", 1_000_000),
];

/// USD notional thresholds: a default plus per-symbol overrides
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdConfig {
    pub default_usd: Decimal,
    pub per_instrument_usd: HashMap<String, Decimal>,
}

impl ThresholdConfig {
    pub fn new(default_usd: Decimal) -> Self {
        Self {
            default_usd,
            per_instrument_usd: HashMap::new(),
        }
    }

    pub fn with_override(mut self, symbol: &str, usd: Decimal) -> Self {
        self.per_instrument_usd.insert(symbol.to_string(), usd);
        self
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            default_usd: Decimal::from(500_000u64),
            per_instrument_usd: DEFAULT_SYMBOL_THRESHOLDS
                .iter()
                .map(|(symbol, usd)| (symbol.to_string(), Decimal::from(*usd)))
                .collect(),
        }
    }
}

/// Alert delivery settings
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    pub enabled: bool,
    pub telegram: Option<TelegramCredentials>,
    pub max_per_minute: u32,
}

impl NotifyConfig {
    /// Credentials to deliver with, if delivery is enabled and configured
    pub fn active_credentials(&self) -> Option<&TelegramCredentials> {
        if self.enabled {
            self.telegram.as_ref()
        } else {
            None
        }
    }
}

/// Complete static configuration, read-only for the process lifetime
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub api_url: String,
    pub ws_url: String,
    pub ws_schema: WireSchema,
    pub thresholds: ThresholdConfig,
    pub max_distance_percent: Decimal,
    pub alert_cooldown_ms: i64,
    pub max_levels_to_scan: usize,
    pub max_subs_per_socket: usize,
    pub reconnect_delay: Duration,
    pub shard_stagger: Duration,
    pub keepalive_interval: Duration,
    pub excluded_suffixes: Vec<String>,
    pub health_log_interval: Duration,
    pub notify: NotifyConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            ws_url: DEFAULT_WS_URL.to_string(),
            ws_schema: WireSchema::Nested,
            thresholds: ThresholdConfig::default(),
            max_distance_percent: Decimal::from(3),
            alert_cooldown_ms: 300_000,
            max_levels_to_scan: 50,
            max_subs_per_socket: 100,
            reconnect_delay: Duration::from_millis(5_000),
            shard_stagger: Duration::from_millis(1_500),
            keepalive_interval: Duration::from_secs(20),
            excluded_suffixes: vec!["/USDC".to_string()],
            health_log_interval: Duration::from_secs(60),
            notify: NotifyConfig {
                enabled: true,
                telegram: None,
                max_per_minute: 20,
            },
        }
    }
}

impl MonitorConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns error if any variable is set but malformed or out of range
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let ws_schema = parse_var(&lookup, "LIGHTER_WS_SCHEMA", defaults.ws_schema)?;
        let ws_url = lookup("LIGHTER_WS_URL").unwrap_or_else(|| ws_schema.default_url().to_string());

        let default_usd = parse_var(
            &lookup,
            "WALL_DEFAULT_THRESHOLD_USD",
            defaults.thresholds.default_usd,
        )?;
        let per_instrument_usd = match lookup("WALL_THRESHOLDS_USD") {
            Some(raw) => parse_overrides(&raw)?,
            None => defaults.thresholds.per_instrument_usd,
        };

        let config = Self {
            api_url: lookup("LIGHTER_API_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_url),
            ws_url,
            ws_schema,
            thresholds: ThresholdConfig {
                default_usd,
                per_instrument_usd,
            },
            max_distance_percent: parse_var(
                &lookup,
                "WALL_MAX_DISTANCE_PERCENT",
                defaults.max_distance_percent,
            )?,
            alert_cooldown_ms: parse_var(&lookup, "ALERT_COOLDOWN_MS", defaults.alert_cooldown_ms)?,
            max_levels_to_scan: parse_var(
                &lookup,
                "MAX_LEVELS_TO_SCAN",
                defaults.max_levels_to_scan,
            )?,
            max_subs_per_socket: parse_var(
                &lookup,
                "MAX_SUBS_PER_SOCKET",
                defaults.max_subs_per_socket,
            )?,
            reconnect_delay: Duration::from_millis(parse_var(&lookup, "RECONNECT_DELAY_MS", 5_000u64)?),
            shard_stagger: Duration::from_millis(parse_var(&lookup, "SHARD_STAGGER_MS", 1_500u64)?),
            keepalive_interval: Duration::from_secs(parse_var(
                &lookup,
                "KEEPALIVE_INTERVAL_SECS",
                20u64,
            )?),
            excluded_suffixes: match lookup("EXCLUDED_SYMBOL_SUFFIXES") {
                Some(raw) => raw
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
                None => defaults.excluded_suffixes,
            },
            health_log_interval: Duration::from_secs(parse_var(
                &lookup,
                "HEALTH_LOG_INTERVAL_SECS",
                60u64,
            )?),
            notify: NotifyConfig {
                enabled: parse_bool(&lookup, "TELEGRAM_ENABLED", defaults.notify.enabled)?,
                telegram: TelegramCredentials::from_lookup(&lookup)?,
                max_per_minute: parse_var(
                    &lookup,
                    "TELEGRAM_MAX_PER_MINUTE",
                    defaults.notify.max_per_minute,
                )?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Range checks that parsing alone cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_subs_per_socket == 0 {
            return Err(invalid("MAX_SUBS_PER_SOCKET", "0", "must be at least 1"));
        }
        if self.max_levels_to_scan == 0 {
            return Err(invalid("MAX_LEVELS_TO_SCAN", "0", "must be at least 1"));
        }
        if self.keepalive_interval.is_zero() {
            return Err(invalid("KEEPALIVE_INTERVAL_SECS", "0", "must be at least 1"));
        }
        if self.notify.max_per_minute == 0 {
            return Err(invalid("TELEGRAM_MAX_PER_MINUTE", "0", "must be at least 1"));
        }
        if self.alert_cooldown_ms < 0 {
            return Err(invalid(
                "ALERT_COOLDOWN_MS",
                &self.alert_cooldown_ms.to_string(),
                "must not be negative",
            ));
        }
        if self.max_distance_percent.is_sign_negative() {
            return Err(invalid(
                "WALL_MAX_DISTANCE_PERCENT",
                &self.max_distance_percent.to_string(),
                "must not be negative",
            ));
        }
        if self.thresholds.default_usd.is_sign_negative() {
            return Err(invalid(
                "WALL_DEFAULT_THRESHOLD_USD",
                &self.thresholds.default_usd.to_string(),
                "must not be negative",
            ));
        }
        Ok(())
    }
}

fn invalid(var: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => {
            let cleaned = raw.trim().replace('_', "");
            cleaned
                .parse()
                .map_err(|e: T::Err| invalid(var, &raw, &e.to_string()))
        }
    }
}

fn parse_bool<F>(lookup: &F, var: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(invalid(var, &raw, "expected true or false")),
        },
    }
}

/// Parses `SYMBOL=USD` pairs separated by commas
fn parse_overrides(raw: &str) -> Result<HashMap<String, Decimal>, ConfigError> {
    let mut overrides = HashMap::new();

    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (symbol, usd) = entry
            .split_once('=')
            .ok_or_else(|| invalid("WALL_THRESHOLDS_USD", entry, "expected SYMBOL=USD"))?;

        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(invalid("WALL_THRESHOLDS_USD", entry, "empty symbol"));
        }

        let usd = Decimal::from_str(&usd.trim().replace('_', ""))
            .map_err(|e| invalid("WALL_THRESHOLDS_USD", entry, &e.to_string()))?;
        if usd.is_sign_negative() {
            return Err(invalid("WALL_THRESHOLDS_USD", entry, "must not be negative"));
        }

        overrides.insert(symbol.to_string(), usd);
    }

    Ok(overrides)
}
