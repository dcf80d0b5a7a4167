//! Configuration Management
//!
//! Static monitor configuration and Telegram credentials, loaded once from
//! environment variables at startup.

pub mod credentials;
pub mod monitor;

use thiserror::Error;

pub use credentials::{SecretString, TelegramCredentials};
pub use monitor::{MonitorConfig, NotifyConfig, ThresholdConfig};

/// Configuration loading errors, always naming the offending variable
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is invalid ({value:?}): {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("{var} is missing: {reason}")]
    Missing {
        var: &'static str,
        reason: &'static str,
    },
}
