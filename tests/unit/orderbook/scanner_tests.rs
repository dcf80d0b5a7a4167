// Unit tests for wall detection properties

use std::str::FromStr;
use std::sync::Arc;

use lighter_wall_monitor::config::ThresholdConfig;
use lighter_wall_monitor::orderbook::{
    AlertDedupCache, OrderBookScanner, OrderBookUpdate, RawLevel, Side, ThresholdPolicy,
};
use rust_decimal::Decimal;

fn scanner(threshold: i64, max_distance: &str) -> OrderBookScanner {
    OrderBookScanner::new(
        ThresholdPolicy::new(ThresholdConfig::new(Decimal::from(threshold))),
        Decimal::from_str(max_distance).unwrap(),
        50,
        Arc::new(AlertDedupCache::new(300_000)),
    )
}

fn book(bids: &[(&str, &str)], asks: &[(&str, &str)]) -> OrderBookUpdate {
    OrderBookUpdate {
        instrument_id: 0,
        bids: bids.iter().map(|(p, s)| RawLevel::new(*p, *s)).collect(),
        asks: asks.iter().map(|(p, s)| RawLevel::new(*p, *s)).collect(),
    }
}

#[test]
fn test_reference_scenario_single_buy_at_100() {
    let events = scanner(500, "3").scan(&book(&[("100", "10")], &[("101", "10")]), "TEST", 0);

    let buys: Vec<_> = events.iter().filter(|e| e.side == Side::Buy).collect();
    assert_eq!(buys.len(), 1);
    assert_eq!(buys[0].price, Decimal::from(100));
    assert_eq!(buys[0].distance_percent.round_dp(3), Decimal::from_str("0.498").unwrap());
    assert!(buys[0].distance_percent > Decimal::from_str("0.497").unwrap());
}

#[test]
fn test_reference_scenario_high_threshold_is_silent() {
    let events = scanner(2000, "3").scan(&book(&[("100", "10")], &[("101", "10")]), "TEST", 0);
    assert!(events.is_empty());
}

#[test]
fn test_never_emits_below_threshold_or_beyond_distance() {
    let bids = [
        ("100", "1"),
        ("99", "30"),
        ("98", "5"),
        ("95", "100"),
        ("90", "1000"),
    ];
    let asks = [("101", "2"), ("102", "40"), ("104", "10"), ("110", "500")];
    let update = book(&bids, &asks);

    for threshold in [0, 100, 500, 1_000, 5_000, 100_000] {
        for max_distance in ["0", "0.5", "1", "3", "10", "100"] {
            let limit = Decimal::from_str(max_distance).unwrap();
            for event in scanner(threshold, max_distance).scan(&update, "TEST", 0) {
                assert!(event.size_usd >= Decimal::from(threshold));
                assert!(event.distance_percent <= limit);
            }
        }
    }
}

#[test]
fn test_empty_side_is_silent() {
    let s = scanner(0, "100");
    assert!(s.scan(&book(&[], &[("101", "10")]), "TEST", 0).is_empty());
    assert!(s.scan(&book(&[("100", "10")], &[]), "TEST", 0).is_empty());
    assert!(s.scan(&book(&[], &[]), "TEST", 0).is_empty());
}

#[test]
fn test_cooldown_shared_between_scanners() {
    let dedup = Arc::new(AlertDedupCache::new(300_000));
    let make = || {
        OrderBookScanner::new(
            ThresholdPolicy::new(ThresholdConfig::new(Decimal::from(500))),
            Decimal::from(3),
            50,
            Arc::clone(&dedup),
        )
    };
    let update = book(&[("100", "10")], &[("101", "1")]);

    let first = make().scan(&update, "TEST", 0);
    let second = make().scan(&update, "TEST", 1);
    assert_eq!(first.len(), 1);
    assert!(second.is_empty());
}
