use std::{env, fmt, str::FromStr, time::Duration};

use leaderboard_core::vote::LEADERBOARD_LIMIT;

use crate::error::ConfigError;

/// Storage backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Backend {
    /// AWS DynamoDB single table.
    #[default]
    Dynamodb,
    /// Process-local maps, lost on exit.
    Inmemory,
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dynamodb" => Ok(Backend::Dynamodb),
            "inmemory" => Ok(Backend::Inmemory),
            _ => Err(ConfigError::UnknownBackend(s.to_string())),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Dynamodb => f.write_str("dynamodb"),
            Backend::Inmemory => f.write_str("inmemory"),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// DynamoDB table name (default: "LeaderboardTable")
    pub table_name: String,
    /// Storage backend (default: dynamodb)
    pub backend: Backend,
    /// Entries shown on a leaderboard, 1 to 24 (default: 24)
    pub leaderboard_size: usize,
    /// Webhook receiving period-close announcements. Log only when unset.
    pub notify_webhook_url: Option<String>,
    /// Upper bound on a single store call in seconds (default: 5)
    pub store_timeout_secs: u64,
    /// Custom DynamoDB endpoint (for local DynamoDB)
    pub aws_endpoint_url: Option<String>,
    /// AWS region (default: "us-east-1")
    pub aws_region: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `LEADERBOARD_TABLE_NAME` - Table name (default: "LeaderboardTable")
    /// - `LEADERBOARD_BACKEND` - `dynamodb` or `inmemory` (default: dynamodb)
    /// - `LEADERBOARD_SIZE` - Leaderboard length, clamped to 1..=24 (default: 24)
    /// - `NOTIFY_WEBHOOK_URL` - Announcement webhook (default: unset)
    /// - `STORE_TIMEOUT_SECS` - Store call timeout (default: 5)
    /// - `AWS_ENDPOINT_URL` - Local DynamoDB endpoint (default: unset)
    /// - `AWS_REGION` - AWS region (default: "us-east-1")
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            table_name: lookup("LEADERBOARD_TABLE_NAME")
                .unwrap_or_else(|| "LeaderboardTable".to_string()),
            backend: lookup("LEADERBOARD_BACKEND")
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            leaderboard_size: lookup("LEADERBOARD_SIZE")
                .and_then(|v| v.parse::<usize>().ok())
                .map(|n| n.clamp(1, LEADERBOARD_LIMIT))
                .unwrap_or(LEADERBOARD_LIMIT),
            notify_webhook_url: lookup("NOTIFY_WEBHOOK_URL").filter(|v| !v.is_empty()),
            store_timeout_secs: lookup("STORE_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(5),
            aws_endpoint_url: lookup("AWS_ENDPOINT_URL").filter(|v| !v.is_empty()),
            aws_region: lookup("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
        }
    }

    /// Get the store timeout as a Duration.
    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
