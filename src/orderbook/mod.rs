//! Order book wall detection over sharded websocket streams
//!
//! - `websocket`: wire codec for both stream schema versions
//! - `scanner`: per-update wall detection with threshold and distance filters
//! - `dedup`: shared per-level alert cooldown
//! - `shard` / `coordinator`: connection lifecycle and instrument partitioning
//! - `health`: per-shard counters folded into a monitor summary

pub mod coordinator;
pub mod dedup;
pub mod health;
pub mod scanner;
pub mod shard;
pub mod types;
pub mod websocket;

pub use coordinator::{partition, ShardCoordinator};
pub use dedup::AlertDedupCache;
pub use health::{HealthStatus, MonitorHealth, ShardStats};
pub use scanner::{OrderBookScanner, ThresholdPolicy};
pub use shard::{ConnectionShard, ShardSettings, ShardState};
pub use types::{
    AlertEvent, AlertKey, Instrument, InstrumentTable, OrderBookLevel, OrderBookUpdate, RawLevel,
    ShardAssignment, Side,
};
pub use websocket::{InboundFrame, WireSchema};
