// Unit tests for alert rendering

use std::str::FromStr;

use lighter_wall_monitor::notify::{format_volume_millions, telegram_message};
use lighter_wall_monitor::orderbook::{AlertEvent, Side};
use rust_decimal::Decimal;

#[test]
fn test_message_carries_every_field() {
    let event = AlertEvent {
        symbol: "SOL".to_string(),
        side: Side::Buy,
        price: Decimal::from_str("142.35").unwrap(),
        size_usd: Decimal::from(12_340_000),
        distance_percent: Decimal::from_str("1.234").unwrap(),
        timestamp: 1_700_000_000_000,
    };
    let text = telegram_message(&event);

    assert!(text.contains("Lighter"));
    assert!(text.contains("`SOL`"));
    assert!(text.contains("BUY (Bid)"));
    assert!(text.contains("`142.35`"));
    assert!(text.contains("`$12.34M`"));
    assert!(text.contains("`1.23%`"));
}

#[test]
fn test_small_volume_keeps_two_decimals() {
    assert_eq!(format_volume_millions(Decimal::from(10_000)), "0.01");
    assert_eq!(format_volume_millions(Decimal::ZERO), "0.00");
}
