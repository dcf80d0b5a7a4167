//! Shard connection health tracking
//!
//! Each shard updates lock-free counters; the coordinator folds them into a
//! single [`MonitorHealth`] summary for periodic logging.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};

/// Frame age above which a connected monitor counts as degraded
pub const STALENESS_THRESHOLD_MS: i64 = 30_000;

/// Counters for one connection shard
#[derive(Debug, Default)]
pub struct ShardStats {
    connects: AtomicU64,
    disconnects: AtomicU64,
    frames: AtomicU64,
    book_updates: AtomicU64,
    alerts: AtomicU64,
    connected: AtomicBool,
    last_frame_ms: AtomicI64,
}

impl ShardStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_connected(&self) {
        self.connects.fetch_add(1, Ordering::Relaxed);
        self.connected.store(true, Ordering::Relaxed);
    }

    pub fn record_disconnected(&self) {
        if self.connected.swap(false, Ordering::Relaxed) {
            self.disconnects.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_frame(&self, now_ms: i64) {
        self.frames.fetch_add(1, Ordering::Relaxed);
        self.last_frame_ms.store(now_ms, Ordering::Relaxed);
    }

    pub fn record_book_update(&self) {
        self.book_updates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_alerts(&self, count: usize) {
        self.alerts.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ShardSnapshot {
        ShardSnapshot {
            connects: self.connects.load(Ordering::Relaxed),
            disconnects: self.disconnects.load(Ordering::Relaxed),
            frames: self.frames.load(Ordering::Relaxed),
            book_updates: self.book_updates.load(Ordering::Relaxed),
            alerts: self.alerts.load(Ordering::Relaxed),
            connected: self.connected.load(Ordering::Relaxed),
            last_frame_ms: self.last_frame_ms.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`ShardStats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShardSnapshot {
    pub connects: u64,
    pub disconnects: u64,
    pub frames: u64,
    pub book_updates: u64,
    pub alerts: u64,
    pub connected: bool,
    /// 0 until the first frame arrives
    pub last_frame_ms: i64,
}

/// Health status levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    /// All shards connected and receiving
    Ok,

    /// Some shards down or data stale
    Degraded,

    /// No shard connected
    Error,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Ok => "ok",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Error => "error",
        }
    }
}

/// Aggregated monitor health
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorHealth {
    pub status: HealthStatus,
    pub shards_total: usize,
    pub shards_connected: usize,
    /// Milliseconds since the freshest frame across all shards, `None` before any
    pub last_frame_age_ms: Option<i64>,
    pub book_updates: u64,
    pub alerts_emitted: u64,
    pub reconnects: u64,
    /// Human-readable reason if status != ok
    pub reason: Option<String>,
}

impl MonitorHealth {
    pub fn from_snapshots(snapshots: &[ShardSnapshot], now_ms: i64) -> Self {
        let shards_total = snapshots.len();
        let shards_connected = snapshots.iter().filter(|s| s.connected).count();

        let last_frame_age_ms = snapshots
            .iter()
            .map(|s| s.last_frame_ms)
            .filter(|ms| *ms > 0)
            .max()
            .map(|latest| now_ms - latest);

        let (status, reason) = if shards_total == 0 {
            (HealthStatus::Ok, None)
        } else if shards_connected == 0 {
            (
                HealthStatus::Error,
                Some("All WebSocket connections down".to_string()),
            )
        } else if last_frame_age_ms.is_some_and(|age| age > STALENESS_THRESHOLD_MS) {
            (
                HealthStatus::Degraded,
                Some(format!(
                    "No frames for {}ms",
                    last_frame_age_ms.unwrap_or_default()
                )),
            )
        } else if shards_connected < shards_total {
            (
                HealthStatus::Degraded,
                Some(format!(
                    "{}/{} WebSocket connections active",
                    shards_connected, shards_total
                )),
            )
        } else {
            (HealthStatus::Ok, None)
        };

        Self {
            status,
            shards_total,
            shards_connected,
            last_frame_age_ms,
            book_updates: snapshots.iter().map(|s| s.book_updates).sum(),
            alerts_emitted: snapshots.iter().map(|s| s.alerts).sum(),
            reconnects: snapshots.iter().map(|s| s.connects.saturating_sub(1)).sum(),
            reason,
        }
    }
}
