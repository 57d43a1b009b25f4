use compact_str::CompactString;
use tracing::{debug, info, warn};

use crate::result::{BotError, Result};

pub const PRACTICUM_TOKEN: &str = "PRACTICUM_TOKEN";
pub const TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
pub const TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

/// Secrets and identifiers needed to poll and notify
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub practicum_token: CompactString,
    pub telegram_token: CompactString,
    /// Destination chat; may be empty, in which case every notification fails
    pub chat_id: CompactString,
}

impl Credentials {
    pub fn new(
        practicum_token: impl Into<CompactString>,
        telegram_token: impl Into<CompactString>,
        chat_id: impl Into<CompactString>,
    ) -> Self {
        Self {
            practicum_token: practicum_token.into(),
            telegram_token: telegram_token.into(),
            chat_id: chat_id.into(),
        }
    }

    /// Load credentials from the process environment, after applying `.env`
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "Loaded .env file"),
            Err(e) if e.not_found() => {},
            Err(e) => warn!(error = %e, "Failed to read .env file"),
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load credentials through `lookup`
    ///
    /// Both tokens are required. A missing chat id is only warned about.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .map(CompactString::from)
                .ok_or(BotError::MissingCredential(key))
        };

        let telegram_token = required(TELEGRAM_TOKEN)?;
        let practicum_token = required(PRACTICUM_TOKEN)?;

        let chat_id = lookup(TELEGRAM_CHAT_ID)
            .map(|v| CompactString::from(v.trim()))
            .unwrap_or_default();
        if chat_id.is_empty() {
            warn!(variable = TELEGRAM_CHAT_ID, "Chat id is not set, notifications will fail");
        }

        info!("Token check passed");

        Ok(Self::new(practicum_token, telegram_token, chat_id))
    }
}

// Tokens never end up in logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("practicum_token", &"***")
            .field("telegram_token", &"***")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn loads_all_credentials() {
        let credentials = Credentials::from_lookup(lookup(&[
            (PRACTICUM_TOKEN, "y0_practicum"),
            (TELEGRAM_TOKEN, "123:telegram"),
            (TELEGRAM_CHAT_ID, "100500"),
        ]))
        .unwrap();

        assert_eq!(credentials, Credentials::new("y0_practicum", "123:telegram", "100500"));
    }

    #[test]
    fn missing_telegram_token_is_fatal() {
        let err = Credentials::from_lookup(lookup(&[(PRACTICUM_TOKEN, "y0_practicum")]))
            .unwrap_err();
        assert!(matches!(err, BotError::MissingCredential(TELEGRAM_TOKEN)));
    }

    #[test]
    fn missing_practicum_token_is_fatal() {
        let err = Credentials::from_lookup(lookup(&[(TELEGRAM_TOKEN, "123:telegram")]))
            .unwrap_err();
        assert!(matches!(err, BotError::MissingCredential(PRACTICUM_TOKEN)));
    }

    #[test]
    fn blank_token_counts_as_missing() {
        let err = Credentials::from_lookup(lookup(&[
            (PRACTICUM_TOKEN, "   "),
            (TELEGRAM_TOKEN, "123:telegram"),
        ]))
        .unwrap_err();
        assert!(matches!(err, BotError::MissingCredential(PRACTICUM_TOKEN)));
    }

    #[test]
    fn missing_chat_id_is_not_fatal() {
        let credentials = Credentials::from_lookup(lookup(&[
            (PRACTICUM_TOKEN, "y0_practicum"),
            (TELEGRAM_TOKEN, "123:telegram"),
        ]))
        .unwrap();
        assert!(credentials.chat_id.is_empty());
    }

    #[test]
    fn debug_output_hides_tokens() {
        let rendered = format!("{:?}", Credentials::new("secret-a", "secret-b", "7"));
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("\"7\""));
    }
}
