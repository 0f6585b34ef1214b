// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process key-value store with per-key TTL.
//!
//! Backs the test suite and `STORE_BACKEND=memory` local runs. Expiry is lazy:
//! an expired key is dropped the next time anything touches it.

use super::{KvStore, StoreError};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
enum Value {
    Str(String),
    List(VecDeque<String>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// DashMap-backed store. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, Entry>>,
}

fn wrong_type(key: &str) -> StoreError {
    StoreError::Backend(format!(
        "WRONGTYPE operation against key {key} holding the wrong kind of value"
    ))
}

/// Resolve Redis-style inclusive indices against a list length.
fn range_bounds(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    let len = len as i64;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
    if start >= len || start > stop {
        return None;
    }
    Some((start as usize, stop as usize))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn purge_if_expired(&self, key: &str) {
        let now = Instant::now();
        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.iter().filter(|e| !e.is_expired(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        self.entries.insert(
            key.to_string(),
            Entry {
                value: Value::Str(value.to_string()),
                expires_at: Some(Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let now = Instant::now();
        let fresh = Entry {
            value: Value::Str(value.to_string()),
            expires_at: Some(now + ttl),
        };
        match self.entries.entry(key.to_string()) {
            MapEntry::Occupied(mut slot) if slot.get().is_expired(now) => {
                slot.insert(fresh);
                Ok(true)
            }
            MapEntry::Occupied(_) => Ok(false),
            MapEntry::Vacant(slot) => {
                slot.insert(fresh);
                Ok(true)
            }
        }
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.purge_if_expired(key);
        match self.entries.get(key) {
            None => Ok(None),
            Some(entry) => match &entry.value {
                Value::Str(s) => Ok(Some(s.clone())),
                Value::List(_) => Err(wrong_type(key)),
            },
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        self.purge_if_expired(key);
        Ok(self.entries.remove(key).is_some())
    }

    async fn list_push_head(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.purge_if_expired(key);
        let mut entry = self.entries.entry(key.to_string()).or_insert_with(|| Entry {
            value: Value::List(VecDeque::new()),
            expires_at: None,
        });
        match &mut entry.value {
            Value::List(list) => {
                list.push_front(value.to_string());
                Ok(())
            }
            Value::Str(_) => Err(wrong_type(key)),
        }
    }

    async fn list_range(
        &self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> Result<Vec<String>, StoreError> {
        self.purge_if_expired(key);
        let Some(entry) = self.entries.get(key) else {
            return Ok(Vec::new());
        };
        let Value::List(list) = &entry.value else {
            return Err(wrong_type(key));
        };
        Ok(match range_bounds(list.len(), start, stop) {
            Some((from, to)) => list.range(from..=to).cloned().collect(),
            None => Vec::new(),
        })
    }

    async fn list_remove(&self, key: &str, value: &str) -> Result<u64, StoreError> {
        self.purge_if_expired(key);
        let Some(mut entry) = self.entries.get_mut(key) else {
            return Ok(0);
        };
        let Value::List(list) = &mut entry.value else {
            return Err(wrong_type(key));
        };
        match list.iter().position(|v| v == value) {
            Some(idx) => {
                list.remove(idx);
                let now_empty = list.is_empty();
                drop(entry);
                if now_empty {
                    self.entries
                        .remove_if(key, |_, e| matches!(&e.value, Value::List(l) if l.is_empty()));
                }
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        self.purge_if_expired(key);
        match self.entries.get_mut(key) {
            Some(mut entry) => {
                entry.expires_at = Some(Instant::now() + ttl);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
