//! In-memory storage backend for testing.
//!
//! This module provides an in-memory implementation of the repository traits
//! that stores all data in HashMaps wrapped in `Arc<RwLock<_>>`. Rows past
//! their expiry are only removed by an explicit
//! [`InMemoryRepository::purge_expired`] call.
//!
//! # Example
//!
//! ```rust,ignore
//! use leaderboard::storage::inmemory::InMemoryRepository;
//!
//! let repo = InMemoryRepository::new();
//! // Use repo for testing...
//! ```

mod repository;

pub use repository::InMemoryRepository;
