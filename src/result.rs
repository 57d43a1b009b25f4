use std::path::PathBuf;

use thiserror::Error;

use crate::client::ClientError;

pub type Result<T> = std::result::Result<T, BotError>;

/// Startup errors; any of these stops the bot before polling begins
#[derive(Debug, Error)]
pub enum BotError {
    #[error("Required environment variable is missing: {0}")]
    MissingCredential(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ClientError),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Failed to open log file {path}: {message}")]
    LogFile { path: PathBuf, message: String },

    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

impl BotError {
    /// Create a log file error
    pub fn log_file(path: PathBuf, source: impl std::fmt::Display) -> Self {
        Self::LogFile { path, message: source.to_string() }
    }

    /// Create a logging initialization error
    pub fn logging(source: impl std::fmt::Display) -> Self {
        Self::Logging(source.to_string())
    }
}
