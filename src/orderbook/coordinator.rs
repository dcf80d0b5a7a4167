//! Shard partitioning and startup
//!
//! The instrument set is cut into fixed-size shards once at startup. Each
//! shard keeps its assignment for the life of the process; shards are
//! started one after another with a stagger to avoid a connection burst.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::MonitorConfig;
use crate::orderbook::health::{MonitorHealth, ShardStats};
use crate::orderbook::scanner::OrderBookScanner;
use crate::orderbook::shard::{ConnectionShard, ShardSettings};
use crate::orderbook::types::{AlertEvent, Instrument, InstrumentTable, ShardAssignment};

/// Split `instruments` into consecutive chunks of at most `max_subs`
///
/// Order is preserved and shard ids start at 1. `max_subs == 0` is treated as 1.
pub fn partition(instruments: &[Instrument], max_subs: usize) -> Vec<ShardAssignment> {
    instruments
        .chunks(max_subs.max(1))
        .enumerate()
        .map(|(i, chunk)| ShardAssignment {
            shard_id: i + 1,
            instruments: chunk.to_vec(),
        })
        .collect()
}

pub struct ShardCoordinator {
    table: Arc<InstrumentTable>,
    assignments: Vec<ShardAssignment>,
    settings: ShardSettings,
    scanner: Arc<OrderBookScanner>,
    alert_tx: mpsc::UnboundedSender<AlertEvent>,
    stagger: Duration,
    stats: Vec<Arc<ShardStats>>,
}

impl ShardCoordinator {
    pub fn new(
        instruments: &[Instrument],
        config: &MonitorConfig,
        scanner: Arc<OrderBookScanner>,
        alert_tx: mpsc::UnboundedSender<AlertEvent>,
    ) -> Self {
        let assignments = partition(instruments, config.max_subs_per_socket);
        let stats = assignments
            .iter()
            .map(|_| Arc::new(ShardStats::new()))
            .collect();

        Self {
            table: Arc::new(InstrumentTable::new(instruments)),
            assignments,
            settings: ShardSettings::from_config(config),
            scanner,
            alert_tx,
            stagger: config.shard_stagger,
            stats,
        }
    }

    pub fn assignments(&self) -> &[ShardAssignment] {
        &self.assignments
    }

    pub fn shard_count(&self) -> usize {
        self.assignments.len()
    }

    /// Spawn every shard, waiting `stagger` between consecutive starts
    ///
    /// Returns early with the handles spawned so far if `cancel` fires
    /// during a stagger wait.
    pub async fn start(&self, cancel: &CancellationToken) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::with_capacity(self.assignments.len());
        let total = self.assignments.len();

        for (idx, (assignment, stats)) in self.assignments.iter().zip(&self.stats).enumerate() {
            info!(
                shard_id = assignment.shard_id,
                markets = assignment.instruments.len(),
                "Starting shard {}/{}",
                idx + 1,
                total
            );

            let shard = ConnectionShard::new(
                assignment.clone(),
                self.settings.clone(),
                Arc::clone(&self.table),
                Arc::clone(&self.scanner),
                self.alert_tx.clone(),
                Arc::clone(stats),
            );
            handles.push(shard.start(cancel.child_token()));

            if idx + 1 < total {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = sleep(self.stagger) => {}
                }
            }
        }

        handles
    }

    /// Aggregate health across all shards
    pub fn health(&self, now_ms: i64) -> MonitorHealth {
        let snapshots: Vec<_> = self.stats.iter().map(|s| s.snapshot()).collect();
        MonitorHealth::from_snapshots(&snapshots, now_ms)
    }
}
