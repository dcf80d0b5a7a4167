//! Time-windowed alert deduplication
//!
//! One cooldown slot per (symbol, side, price). Expired slots are swept in a
//! batch once the map grows past a high-water mark, so no timer task is needed.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::debug;

use crate::orderbook::types::AlertKey;

/// Entry count above which expired slots are swept
pub const DEFAULT_HIGH_WATER_MARK: usize = 2000;

/// Cooldown cache shared by every shard
///
/// Check-and-record happens under a single lock: two shards racing on the
/// same key within one instant cannot both be granted.
pub struct AlertDedupCache {
    cooldown_ms: i64,
    high_water_mark: usize,
    entries: Mutex<HashMap<AlertKey, i64>>,
}

impl AlertDedupCache {
    pub fn new(cooldown_ms: i64) -> Self {
        Self::with_high_water_mark(cooldown_ms, DEFAULT_HIGH_WATER_MARK)
    }

    pub fn with_high_water_mark(cooldown_ms: i64, high_water_mark: usize) -> Self {
        Self {
            cooldown_ms,
            high_water_mark,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn cooldown_ms(&self) -> i64 {
        self.cooldown_ms
    }

    /// Returns true and records `now_ms` if `key` is outside its cooldown
    pub fn should_alert(&self, key: AlertKey, now_ms: i64) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(&last_fired) = entries.get(&key) {
            if now_ms - last_fired < self.cooldown_ms {
                return false;
            }
        }

        entries.insert(key, now_ms);

        if entries.len() > self.high_water_mark {
            let before = entries.len();
            let cooldown_ms = self.cooldown_ms;
            entries.retain(|_, last_fired| now_ms - *last_fired <= cooldown_ms);
            debug!(
                before,
                after = entries.len(),
                "Swept expired alert cooldown entries"
            );
        }

        true
    }

    /// Number of live and not-yet-swept entries
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
