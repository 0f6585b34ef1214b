// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Redis-backed key-value store.
//!
//! Uses a multiplexed `ConnectionManager` (cheap to clone, reconnects on its own).
//! Every command is bounded by the configured store timeout; when the request
//! future is dropped the in-flight command is abandoned with it.

use super::{KvStore, StoreError};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::future::Future;
use std::time::Duration;

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Redis client wrapper.
#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
    timeout: Duration,
}

fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

impl RedisStore {
    /// Connect to Redis at `url`.
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let manager = tokio::time::timeout(timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| StoreError::Timeout)??;

        tracing::info!("Connected to Redis");

        Ok(Self { manager, timeout })
    }

    async fn bounded<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match tokio::time::timeout(self.timeout, op).await {
            Ok(result) => result.map_err(StoreError::from),
            Err(_) => Err(StoreError::Timeout),
        }
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut con = self.manager.clone();
        self.bounded(async move {
            let _: () = con.set_ex(key, value, ttl_secs(ttl)).await?;
            Ok::<_, redis::RedisError>(())
        })
        .await
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let mut con = self.manager.clone();
        self.bounded(async move {
            let reply: Option<String> = redis::cmd("SET")
                .arg(key)
                .arg(value)
                .arg("NX")
                .arg("EX")
                .arg(ttl_secs(ttl))
                .query_async(&mut con)
                .await?;
            Ok::<_, redis::RedisError>(reply.is_some())
        })
        .await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut con = self.manager.clone();
        self.bounded(async move { con.get(key).await }).await
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut con = self.manager.clone();
        self.bounded(async move {
            let removed: u64 = con.del(key).await?;
            Ok::<_, redis::RedisError>(removed > 0)
        })
        .await
    }

    async fn list_push_head(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut con = self.manager.clone();
        self.bounded(async move {
            let _: i64 = con.lpush(key, value).await?;
            Ok::<_, redis::RedisError>(())
        })
        .await
    }

    async fn list_range(
        &self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> Result<Vec<String>, StoreError> {
        let mut con = self.manager.clone();
        self.bounded(async move { con.lrange(key, start as isize, stop as isize).await })
            .await
    }

    async fn list_remove(&self, key: &str, value: &str) -> Result<u64, StoreError> {
        let mut con = self.manager.clone();
        self.bounded(async move { con.lrem(key, 1, value).await })
            .await
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        let mut con = self.manager.clone();
        self.bounded(async move { con.expire(key, ttl_secs(ttl) as i64).await })
            .await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut con = self.manager.clone();
        self.bounded(async move {
            let _: String = redis::cmd("PING").query_async(&mut con).await?;
            Ok::<_, redis::RedisError>(())
        })
        .await
    }
}
