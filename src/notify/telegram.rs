//! Telegram Bot API delivery

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::TelegramCredentials;
use crate::error::VenueError;

const TELEGRAM_API_URL: &str = "https://api.telegram.org";

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Posts Markdown messages to one chat
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    client: Client,
    api_url: String,
    credentials: TelegramCredentials,
}

impl TelegramNotifier {
    pub fn new(credentials: TelegramCredentials) -> Result<Self, VenueError> {
        Self::with_api_url(credentials, TELEGRAM_API_URL)
    }

    pub fn with_api_url(
        credentials: TelegramCredentials,
        api_url: impl Into<String>,
    ) -> Result<Self, VenueError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| VenueError::InternalError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn chat_id(&self) -> &str {
        &self.credentials.chat_id
    }

    /// Send one message
    ///
    /// # Errors
    /// Non-2xx replies surface Telegram's `description` when it sends one.
    pub async fn send(&self, text: &str) -> Result<(), VenueError> {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.api_url,
            self.credentials.bot_token.expose_secret()
        );
        let body = SendMessageRequest {
            chat_id: &self.credentials.chat_id,
            text,
            parse_mode: "Markdown",
        };

        // Token is part of the URL; strip it from transport errors
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| VenueError::from(e.without_url()))?;

        let status = resp.status();
        let reply = resp
            .json::<ApiResponse>()
            .await
            .map_err(|e| VenueError::from(e.without_url()));

        match reply {
            Ok(reply) if status.is_success() && reply.ok => Ok(()),
            Ok(reply) => Err(api_error(status.as_u16(), reply.description)),
            Err(_) if status.is_success() => Ok(()),
            Err(_) => Err(api_error(status.as_u16(), None)),
        }
    }
}

fn api_error(status: u16, description: Option<String>) -> VenueError {
    let detail = description.unwrap_or_else(|| format!("HTTP {}", status));
    match status {
        429 => VenueError::RateLimitError(detail),
        400..=499 => VenueError::InvalidRequest(detail),
        _ => VenueError::ConnectionError(detail),
    }
}
