//! Configuration for the review API client, the notifier and the poller

use std::time::Duration;

use compact_str::CompactString;

use super::error::{ClientError, Result};
use crate::config::Credentials;

pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";
pub const DEFAULT_TELEGRAM_API: &str = "https://api.telegram.org";

/// Main configuration shared by the API client, notifier and poller
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Homework statuses endpoint
    pub endpoint: CompactString,
    /// Telegram Bot API base URL
    pub telegram_api: CompactString,
    pub credentials: Credentials,
    /// Polling configuration
    pub polling: PollingConfig,
    /// Request configuration
    pub request: RequestConfig,
}

/// Polling interval configuration
#[derive(Debug, Clone)]
pub struct PollingConfig {
    /// Pause after every cycle, successful or not
    pub retry_interval: Duration,
}

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// Request timeout, applied to both the review API and Telegram
    pub timeout: Duration,
    pub user_agent: CompactString,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { retry_interval: Duration::from_secs(600) }
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("homework-bot/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl ClientConfig {
    /// Create a new client configuration pointing at the production endpoints
    pub fn new(credentials: Credentials) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            telegram_api: DEFAULT_TELEGRAM_API.into(),
            credentials,
            polling: PollingConfig::default(),
            request: RequestConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validate_url("endpoint", &self.endpoint)?;
        validate_url("telegram_api", &self.telegram_api)?;

        if self.credentials.practicum_token.is_empty() {
            return Err(ClientError::config_validation(
                "practicum_token",
                "Practicum token cannot be empty",
            ));
        }

        if self.credentials.telegram_token.is_empty() {
            return Err(ClientError::config_validation(
                "telegram_token",
                "Telegram token cannot be empty",
            ));
        }

        if self.request.timeout.is_zero() {
            return Err(ClientError::config_validation(
                "timeout",
                "Timeout must be greater than zero",
            ));
        }

        if self.request.timeout >= self.polling.retry_interval {
            return Err(ClientError::config_validation(
                "timeout",
                "Timeout must be shorter than the retry interval",
            ));
        }

        Ok(())
    }
}

fn validate_url(field: &str, value: &str) -> Result<()> {
    if !value.starts_with("http://") && !value.starts_with("https://") {
        return Err(ClientError::config_validation(
            field,
            "URL must start with http:// or https://",
        ));
    }

    if url::Url::parse(value).is_err() {
        return Err(ClientError::config_validation(field, "URL is not a valid URL format"));
    }

    Ok(())
}

impl ClientConfig {
    /// Set the homework statuses endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<CompactString>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the Telegram Bot API base URL
    pub fn with_telegram_api(mut self, telegram_api: impl Into<CompactString>) -> Self {
        self.telegram_api = telegram_api.into();
        self
    }

    pub fn with_retry_interval(mut self, retry_interval: Duration) -> Self {
        self.polling.retry_interval = retry_interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request.timeout = timeout;
        self
    }
}
