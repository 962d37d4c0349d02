//! Error types of the imperative shell.

use thiserror::Error;

use leaderboard_core::storage::RepositoryError;

/// Errors that can occur when configuring the application.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown storage backend: {0} (expected dynamodb or inmemory)")]
    UnknownBackend(String),

    #[error("Storage backend '{0}' is not compiled in, enable the '{0}' feature")]
    BackendUnavailable(&'static str),

    #[error("Invalid notification webhook: {0}")]
    InvalidWebhook(String),
}

/// Errors that can occur when delivering an announcement.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Notification endpoint returned {status}: {message}")]
    Rejected { status: u16, message: String },
}

/// Errors that can occur while closing a month.
#[derive(Debug, Error)]
pub enum CloseError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Notify(#[from] NotifyError),
}
