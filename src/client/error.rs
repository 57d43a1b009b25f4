//! Error types for a single poll cycle

use compact_str::CompactString;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

/// Everything that can end a poll cycle early
///
/// None of these are fatal to the process: the poller logs them and tries
/// again after the retry interval.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response (network, DNS, timeout)
    #[error("Request to {endpoint} failed: {source}")]
    FetchFailed {
        endpoint: CompactString,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status code
    #[error("Server responded with HTTP {status}: {body}")]
    ServerError { status: u16, body: CompactString },

    #[error("Malformed response: {0}")]
    MalformedResponse(CompactString),

    #[error("Required field is missing: {0}")]
    MissingField(&'static str),

    #[error("Unknown homework status: {0}")]
    UnknownStatus(CompactString),

    #[error("Failed to deliver notification: {0}")]
    NotifyFailed(CompactString),

    #[error("Invalid configuration for {field}: {message}")]
    ConfigValidation {
        field: CompactString,
        message: CompactString,
    },
}

impl ClientError {
    pub fn fetch_failed(endpoint: impl Into<CompactString>, source: reqwest::Error) -> Self {
        Self::FetchFailed { endpoint: endpoint.into(), source }
    }

    /// Create a server error, keeping only the head of the body
    pub fn server_error(status: u16, body: &str) -> Self {
        const MAX_BODY: usize = 200;
        let body = match body.char_indices().nth(MAX_BODY) {
            Some((idx, _)) => CompactString::from(&body[..idx]),
            None => CompactString::from(body),
        };
        Self::ServerError { status, body }
    }

    pub fn malformed(message: impl Into<CompactString>) -> Self {
        Self::MalformedResponse(message.into())
    }

    pub fn unknown_status(status: impl Into<CompactString>) -> Self {
        Self::UnknownStatus(status.into())
    }

    pub fn notify_failed(message: impl std::fmt::Display) -> Self {
        Self::NotifyFailed(message.to_string().into())
    }

    pub fn config_validation(
        field: impl Into<CompactString>,
        message: impl Into<CompactString>,
    ) -> Self {
        Self::ConfigValidation { field: field.into(), message: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_truncates_long_bodies() {
        let body = "ж".repeat(500);
        match ClientError::server_error(500, &body) {
            ClientError::ServerError { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body.chars().count(), 200);
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn messages_carry_context() {
        assert_eq!(
            ClientError::MissingField("homeworks").to_string(),
            "Required field is missing: homeworks"
        );
        assert_eq!(
            ClientError::unknown_status("lost").to_string(),
            "Unknown homework status: lost"
        );
        assert_eq!(
            ClientError::server_error(503, "down").to_string(),
            "Server responded with HTTP 503: down"
        );
    }
}
