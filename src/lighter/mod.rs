//! Lighter REST API Client
//!
//! Market discovery for the order book monitor.

pub mod client;
pub mod types;

pub use client::LighterClient;
pub use types::{instruments_from_listings, MarketListing};
