use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Lighter API error: {0}")]
    Venue(#[from] VenueError),

    #[error("Initialization error: {0}")]
    Initialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors raised by calls to the Lighter REST API and the Telegram Bot API
#[derive(Error, Debug)]
pub enum VenueError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimitError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl VenueError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            VenueError::ConnectionError(_) | VenueError::RateLimitError(_)
        )
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            VenueError::ConnectionError(_) => "connection_error",
            VenueError::RateLimitError(_) => "rate_limit",
            VenueError::ParseError(_) => "parse_error",
            VenueError::InvalidRequest(_) => "invalid_request",
            VenueError::InternalError(_) => "internal_error",
        }
    }
}

impl From<reqwest::Error> for VenueError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            VenueError::ConnectionError(
                "Request timeout. Please check your internet connection.".to_string(),
            )
        } else if err.is_connect() {
            VenueError::ConnectionError(format!(
                "Failed to connect to {}. Please check your internet connection.",
                err.url().map(|u| u.as_str()).unwrap_or("remote host")
            ))
        } else if let Some(status) = err.status() {
            match status.as_u16() {
                429 => VenueError::RateLimitError(
                    "Too many requests. Retry after 60 seconds.".to_string(),
                ),
                403 => VenueError::ConnectionError(
                    "Request rejected (HTTP 403). Please reduce request frequency.".to_string(),
                ),
                500..=599 => VenueError::ConnectionError(format!(
                    "Server error (HTTP {}). Please try again later.",
                    status.as_u16()
                )),
                _ => VenueError::InternalError(format!("HTTP error: {}", status)),
            }
        } else if err.is_decode() {
            VenueError::ParseError(format!("Response body could not be decoded: {}", err))
        } else {
            VenueError::InternalError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for VenueError {
    fn from(err: serde_json::Error) -> Self {
        VenueError::ParseError(format!("JSON parsing failed: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, MonitorError>;
