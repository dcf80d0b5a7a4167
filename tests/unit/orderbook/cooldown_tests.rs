// Unit tests for the per-level alert cooldown

use lighter_wall_monitor::orderbook::{AlertDedupCache, AlertKey, Side};
use rust_decimal::Decimal;

fn key(price: i64) -> AlertKey {
    AlertKey::new("BTC", Side::Buy, Decimal::from(price))
}

#[test]
fn test_second_alert_suppressed_iff_within_cooldown() {
    let cooldown = 1_000;
    for delta in [0, 1, 500, 999, 1_000, 1_001, 5_000] {
        let cache = AlertDedupCache::new(cooldown);
        assert!(cache.should_alert(key(100), 10_000));
        let second = cache.should_alert(key(100), 10_000 + delta);
        assert_eq!(second, delta >= cooldown, "delta {}", delta);
    }
}

#[test]
fn test_suppressed_attempt_does_not_extend_window() {
    let cache = AlertDedupCache::new(1_000);
    assert!(cache.should_alert(key(100), 0));
    assert!(!cache.should_alert(key(100), 900));
    assert!(cache.should_alert(key(100), 1_000));
}

#[test]
fn test_keys_are_independent() {
    let cache = AlertDedupCache::new(60_000);
    assert!(cache.should_alert(key(100), 0));
    assert!(cache.should_alert(key(101), 0));
    assert!(cache.should_alert(AlertKey::new("BTC", Side::Sell, Decimal::from(100)), 0));
    assert!(cache.should_alert(AlertKey::new("ETH", Side::Buy, Decimal::from(100)), 0));
    assert_eq!(cache.len(), 4);
}

#[test]
fn test_sweep_keeps_cache_bounded() {
    let cache = AlertDedupCache::with_high_water_mark(1_000, 10);
    for price in 0..10 {
        assert!(cache.should_alert(key(price), 0));
    }
    // Everything above is expired by now; the insert past the mark sweeps it
    assert!(cache.should_alert(key(1_000), 5_000));
    assert!(cache.len() <= 2);
}
