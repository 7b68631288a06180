//! Error types.

use std::time::Duration;

use thiserror::Error;

/// Failures while fetching or reading the notification count.
///
/// These never reach the user; the poller logs them and keeps its schedule.
#[derive(Error, Debug)]
pub enum PollError {
    #[cfg(feature = "http")]
    #[error("Notification count request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Notification count request returned status {0}")]
    Status(u16),
    #[error("Notification count response is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Notification count request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Notification count source unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error("No base URL configured for the notification count endpoint")]
    MissingBaseUrl,
}

#[derive(Error, Debug)]
pub enum UiError {
    #[error("Page controllers must be created inside a Tokio runtime")]
    NoRuntime,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Poll(#[from] PollError),
}
