// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Storage layer: a TTL-capable key-value store and the typed record store on top.

pub mod memory;
pub mod records;
pub mod redis_store;

pub use memory::MemoryStore;
pub use records::RecordStore;
pub use redis_store::RedisStore;

use async_trait::async_trait;
use std::time::Duration;

/// Retention for user documents.
pub const USER_TTL: Duration = Duration::from_secs(24 * 60 * 60);
/// Retention for health records and the per-user index.
pub const RECORD_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);
/// Lifetime of a cached stats aggregate.
pub const STATS_TTL: Duration = Duration::from_secs(60 * 60);
/// Upper bound on one page of the record index.
pub const MAX_PAGE_SIZE: usize = 100;

/// Key layout. Every key is namespaced by entity kind and owner.
pub mod keys {
    pub fn user(email: &str) -> String {
        format!("user:{email}")
    }

    pub fn record(user_id: &str, record_id: &str) -> String {
        format!("health:{user_id}:{record_id}")
    }

    pub fn record_index(user_id: &str) -> String {
        format!("health:{user_id}:list")
    }

    pub fn stats(user_id: &str, record_type: &str) -> String {
        format!("health:{user_id}:stats:{record_type}")
    }
}

/// Errors surfaced by any key-value backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),

    #[error("store operation timed out")]
    Timeout,

    #[error("stored value at {key} is corrupt: {reason}")]
    Corrupt { key: String, reason: String },

    #[error("failed to encode value: {0}")]
    Encode(String),
}

/// Operations the application needs from the key-value service.
///
/// Single-key operations are atomic. Multi-key sequences are not.
/// List indices follow Redis conventions: inclusive, negative counts from the end.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Store only when the key is absent. Returns whether the write happened.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration)
        -> Result<bool, StoreError>;

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Returns whether a key was removed.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    async fn list_push_head(&self, key: &str, value: &str) -> Result<(), StoreError>;

    async fn list_range(&self, key: &str, start: i64, stop: i64)
        -> Result<Vec<String>, StoreError>;

    /// Remove the first occurrence of `value`. Returns the number removed.
    async fn list_remove(&self, key: &str, value: &str) -> Result<u64, StoreError>;

    /// Returns false when the key does not exist.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
