//! Alert delivery
//!
//! Detected walls are logged and, when credentials are configured, posted to
//! Telegram. Delivery is fire-and-forget and never blocks a shard.

pub mod dispatcher;
pub mod formatter;
pub mod rate_limiter;
pub mod telegram;

pub use dispatcher::AlertDispatcher;
pub use formatter::{format_distance, format_volume_millions, telegram_message};
pub use rate_limiter::{RateLimiter, RateLimiterError};
pub use telegram::TelegramNotifier;
