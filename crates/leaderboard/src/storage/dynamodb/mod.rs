//! DynamoDB storage backend implementation.
//!
//! This module provides a DynamoDB-based implementation of the repository traits
//! using `aws-sdk-dynamodb`. Votes and tallies share one table keyed by the
//! string attributes `pk` and `sk`; tallies carry a `ttl` attribute that the
//! table's time-to-live setting uses to purge them.

mod conversions;
mod error;
pub mod keys;
mod repository;

pub use repository::DynamoDbRepository;
