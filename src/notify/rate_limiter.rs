//! Outbound pacing for Telegram notifications
//!
//! GCRA (Generic Cell Rate Algorithm) via governor. Messages queue for at
//! most `queue_timeout` and are rejected after that.

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorRateLimiter,
};
use std::num::NonZeroU32;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use tracing::debug;

/// Telegram allows roughly 20 messages per minute into one group
const DEFAULT_MESSAGES_PER_MINUTE: u32 = 20;

const DEFAULT_QUEUE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum RateLimiterError {
    #[error("Rate limit queue timeout after {0:?}")]
    QueueTimeout(Duration),
}

pub struct RateLimiter {
    limiter: GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    queue_timeout: Duration,
}

impl RateLimiter {
    /// `per_minute == 0` is treated as 1
    pub fn with_quota(per_minute: u32, queue_timeout: Duration) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN));

        Self {
            limiter: GovernorRateLimiter::direct(quota),
            queue_timeout,
        }
    }

    pub fn per_minute(per_minute: u32) -> Self {
        Self::with_quota(per_minute, DEFAULT_QUEUE_TIMEOUT)
    }

    /// Wait for a permit, giving up after the queue timeout
    pub async fn wait(&self) -> Result<(), RateLimiterError> {
        let waited = timeout(self.queue_timeout, async {
            while self.limiter.check().is_err() {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        })
        .await;

        match waited {
            Ok(()) => {
                debug!("Rate limit permission granted");
                Ok(())
            }
            Err(_) => Err(RateLimiterError::QueueTimeout(self.queue_timeout)),
        }
    }

    /// Take a permit only if one is available now
    pub fn check_immediate(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::per_minute(DEFAULT_MESSAGES_PER_MINUTE)
    }
}
