// Library exports for lighter-wall-monitor

pub mod config; // Environment configuration
pub mod error;
pub mod lighter; // Lighter REST client (market discovery)
pub mod notify; // Alert logging and Telegram delivery
pub mod orderbook; // Sharded order book streams and wall detection
