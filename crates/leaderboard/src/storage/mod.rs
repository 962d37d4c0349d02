//! Storage backend implementations.
//!
//! This module provides concrete implementations of the repository traits
//! defined in `leaderboard_core::storage`. Backends are compiled in via
//! feature flags and picked at runtime from [`Config::backend`].
//!
//! # Feature Flags
//!
//! - `dynamodb` (default): AWS DynamoDB storage backend using `aws-sdk-dynamodb`
//! - `inmemory` (default): process-local backend for tests and local runs

use std::sync::Arc;

use leaderboard_core::storage::{TallyRepository, VoteRepository};

use crate::config::{Backend, Config};
use crate::error::ConfigError;

#[cfg(not(any(feature = "inmemory", feature = "dynamodb")))]
compile_error!("Must enable at least one storage feature: 'inmemory' or 'dynamodb'");

#[cfg(feature = "dynamodb")]
pub mod dynamodb;

#[cfg(feature = "inmemory")]
pub mod inmemory;

#[cfg(feature = "dynamodb")]
pub use dynamodb::DynamoDbRepository;

#[cfg(feature = "inmemory")]
pub use inmemory::InMemoryRepository;

/// The two repositories, usually backed by the same store.
#[derive(Clone)]
pub struct Repositories {
    pub votes: Arc<dyn VoteRepository>,
    pub tallies: Arc<dyn TallyRepository>,
}

impl Repositories {
    /// Wraps one backend implementing both traits.
    pub fn shared<R>(repo: R) -> Self
    where
        R: VoteRepository + TallyRepository + 'static,
    {
        let repo = Arc::new(repo);
        Self {
            votes: repo.clone(),
            tallies: repo,
        }
    }
}

/// Builds the repositories for the configured backend.
pub async fn connect(config: &Config) -> Result<Repositories, ConfigError> {
    match config.backend {
        #[cfg(feature = "dynamodb")]
        Backend::Dynamodb => {
            tracing::info!(
                table = %config.table_name,
                region = %config.aws_region,
                endpoint = config.aws_endpoint_url.as_deref().unwrap_or("default"),
                "Using DynamoDB storage"
            );
            let repo = DynamoDbRepository::connect(
                config.table_name.clone(),
                &config.aws_region,
                config.aws_endpoint_url.as_deref(),
                config.store_timeout(),
            )
            .await;
            Ok(Repositories::shared(repo))
        }
        #[cfg(feature = "inmemory")]
        Backend::Inmemory => {
            tracing::info!("Using in-memory storage, data is lost on exit");
            Ok(Repositories::shared(InMemoryRepository::new()))
        }
        #[allow(unreachable_patterns)]
        other => Err(ConfigError::BackendUnavailable(match other {
            Backend::Dynamodb => "dynamodb",
            Backend::Inmemory => "inmemory",
        })),
    }
}
