//! Alert fan-out task
//!
//! Drains the alert channel shared by all shards. Every event is logged;
//! with a notifier configured it is also paced and sent on its own task.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::notify::formatter::{format_distance, format_volume_millions, telegram_message};
use crate::notify::rate_limiter::RateLimiter;
use crate::notify::telegram::TelegramNotifier;
use crate::orderbook::types::AlertEvent;

pub struct AlertDispatcher {
    notifier: Option<Arc<TelegramNotifier>>,
    limiter: Arc<RateLimiter>,
}

impl AlertDispatcher {
    pub fn new(notifier: Option<TelegramNotifier>, limiter: RateLimiter) -> Self {
        Self {
            notifier: notifier.map(Arc::new),
            limiter: Arc::new(limiter),
        }
    }

    /// Log-only dispatcher
    pub fn log_only() -> Self {
        Self::new(None, RateLimiter::default())
    }

    pub fn delivers(&self) -> bool {
        self.notifier.is_some()
    }

    pub fn start(
        self,
        rx: mpsc::UnboundedReceiver<AlertEvent>,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(self.run(rx, cancel))
    }

    /// Runs until cancelled or every sender is dropped
    pub async fn run(self, mut rx: mpsc::UnboundedReceiver<AlertEvent>, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Alert dispatcher cancelled");
                    break;
                }
                event = rx.recv() => match event {
                    Some(event) => self.dispatch(&event),
                    None => {
                        debug!("Alert channel closed");
                        break;
                    }
                },
            }
        }
    }

    /// Log `event` and hand it to the notifier without waiting for delivery
    pub fn dispatch(&self, event: &AlertEvent) {
        info!(
            symbol = %event.symbol,
            side = %event.side,
            price = %event.price.normalize(),
            volume_musd = %format_volume_millions(event.size_usd),
            distance_pct = %format_distance(event.distance_percent),
            "Large order detected"
        );

        let Some(notifier) = self.notifier.as_ref().map(Arc::clone) else {
            return;
        };
        let limiter = Arc::clone(&self.limiter);
        let text = telegram_message(event);
        let symbol = event.symbol.clone();

        tokio::spawn(async move {
            if let Err(e) = limiter.wait().await {
                warn!(symbol = %symbol, error = %e, "Telegram quota exhausted, alert dropped");
                return;
            }
            if let Err(e) = notifier.send(&text).await {
                warn!(symbol = %symbol, error = %e, "Telegram delivery failed");
            }
        });
    }
}
