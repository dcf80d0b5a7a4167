//! Telegram Credential Management
//!
//! Bot token and chat id for alert delivery, loaded from environment variables.
//! The token is never logged at INFO/WARN levels and is masked when displayed.

use std::fmt;

use super::ConfigError;

/// Secure string wrapper that masks sensitive data in logs
///
/// Debug output shows only `SecretString(***)` and Display shows the
/// truncated form `first4...last4`.
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: String) -> Self {
        SecretString(value)
    }

    /// Returns a reference to the inner string
    ///
    /// Only use this when building the outbound request URL.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    /// Returns a masked version of the secret for safe logging
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 8 {
            return "***".to_string();
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString(***)")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.masked())
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        SecretString::new(s)
    }
}

/// Telegram Bot API credentials
#[derive(Clone, Debug)]
pub struct TelegramCredentials {
    pub bot_token: SecretString,
    /// Target chat or channel id (e.g. `-1001234567890`)
    pub chat_id: String,
}

impl TelegramCredentials {
    /// Loads credentials through `lookup` (normally `std::env::var`)
    ///
    /// Reads `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_ID`, trimming whitespace.
    /// Returns `Ok(None)` when neither is set, which disables notifications.
    pub fn from_lookup<F>(lookup: F) -> Result<Option<Self>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup("TELEGRAM_BOT_TOKEN")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        let chat_id = lookup("TELEGRAM_CHAT_ID")
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        match (token, chat_id) {
            (None, None) => Ok(None),
            (Some(token), Some(chat_id)) => Ok(Some(Self {
                bot_token: SecretString::new(token),
                chat_id,
            })),
            (Some(_), None) => Err(ConfigError::Missing {
                var: "TELEGRAM_CHAT_ID",
                reason: "required when TELEGRAM_BOT_TOKEN is set",
            }),
            (None, Some(_)) => Err(ConfigError::Missing {
                var: "TELEGRAM_BOT_TOKEN",
                reason: "required when TELEGRAM_CHAT_ID is set",
            }),
        }
    }
}
