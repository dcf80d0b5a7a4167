//! Human-readable alert rendering

use rust_decimal::{Decimal, RoundingStrategy};

use crate::orderbook::types::{AlertEvent, Side};

const VENUE_NAME: &str = "Lighter";

fn two_places(value: Decimal) -> String {
    format!(
        "{:.2}",
        value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

/// Notional in millions with two decimals, e.g. `1.25` for 1 250 000
pub fn format_volume_millions(size_usd: Decimal) -> String {
    two_places(size_usd / Decimal::from(1_000_000))
}

pub fn format_distance(distance_percent: Decimal) -> String {
    two_places(distance_percent)
}

fn side_label(side: Side) -> &'static str {
    match side {
        Side::Buy => "🟢 BUY (Bid)",
        Side::Sell => "🔴 SELL (Ask)",
    }
}

/// Telegram Markdown body for one alert
pub fn telegram_message(event: &AlertEvent) -> String {
    format!(
        "⬛ *{}*\n*Instrument:* `{}`\n*Side:* `{}`\n*Price:* `{}`\n*Volume:* `${}M`\n*Distance:* `{}%`",
        VENUE_NAME,
        event.symbol,
        side_label(event.side),
        event.price.normalize(),
        format_volume_millions(event.size_usd),
        format_distance(event.distance_percent),
    )
}
