// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Typed persistence for users, health records and cached stats.
//!
//! Values are stored as JSON strings under the namespaced keys in [`super::keys`].
//! Multi-key sequences (record + index + stats) are not transactional: a record
//! written without its index entry is simply invisible to listings.

use super::{keys, KvStore, StoreError, MAX_PAGE_SIZE, RECORD_TTL, STATS_TTL, USER_TTL};
use crate::models::{HealthRecord, HealthStats, RecordType, User};
use futures_util::{stream, StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

const MAX_CONCURRENT_DB_OPS: usize = 50;

/// Typed wrapper around a shared [`KvStore`].
#[derive(Clone)]
pub struct RecordStore {
    kv: Arc<dyn KvStore>,
}

impl RecordStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Reachability check against the backend.
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.kv.ping().await
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.kv.get(key).await? {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| StoreError::Corrupt {
                    key: key.to_string(),
                    reason: e.to_string(),
                }),
        }
    }

    fn encode<T: Serialize>(value: &T) -> Result<String, StoreError> {
        serde_json::to_string(value).map_err(|e| StoreError::Encode(e.to_string()))
    }

    async fn put_json<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        self.kv.set(key, &Self::encode(value)?, ttl).await
    }

    // ─── Users ──────────────────────────────────────────────────

    pub async fn user_exists(&self, email: &str) -> Result<bool, StoreError> {
        Ok(self.kv.get(&keys::user(email)).await?.is_some())
    }

    /// Write a user unconditionally.
    pub async fn put_user(&self, user: &User) -> Result<(), StoreError> {
        self.put_json(&keys::user(&user.email), user, USER_TTL).await
    }

    /// Write a user only if no user holds that email. Returns false on a clash.
    pub async fn create_user(&self, user: &User) -> Result<bool, StoreError> {
        self.kv
            .set_if_absent(&keys::user(&user.email), &Self::encode(user)?, USER_TTL)
            .await
    }

    pub async fn get_user(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.get_json(&keys::user(email)).await
    }

    // ─── Health records ─────────────────────────────────────────

    pub async fn put_record(&self, record: &HealthRecord) -> Result<(), StoreError> {
        self.put_json(&keys::record(&record.user_id, &record.id), record, RECORD_TTL)
            .await
    }

    pub async fn get_record(
        &self,
        user_id: &str,
        record_id: &str,
    ) -> Result<Option<HealthRecord>, StoreError> {
        self.get_json(&keys::record(user_id, record_id)).await
    }

    pub async fn delete_record(&self, user_id: &str, record_id: &str) -> Result<bool, StoreError> {
        self.kv.delete(&keys::record(user_id, record_id)).await
    }

    /// Push a record id at the head of the user's index and refresh the index TTL.
    pub async fn append_to_index(&self, user_id: &str, record_id: &str) -> Result<(), StoreError> {
        let key = keys::record_index(user_id);
        self.kv.list_push_head(&key, record_id).await?;
        self.kv.expire(&key, RECORD_TTL).await?;
        Ok(())
    }

    pub async fn remove_from_index(
        &self,
        user_id: &str,
        record_id: &str,
    ) -> Result<bool, StoreError> {
        let removed = self
            .kv
            .list_remove(&keys::record_index(user_id), record_id)
            .await?;
        Ok(removed > 0)
    }

    /// One page of record ids, newest first. `count` is capped at [`MAX_PAGE_SIZE`].
    pub async fn range_index(
        &self,
        user_id: &str,
        offset: usize,
        count: usize,
    ) -> Result<Vec<String>, StoreError> {
        let count = count.min(MAX_PAGE_SIZE);
        if count == 0 {
            return Ok(Vec::new());
        }
        let start = offset as i64;
        let stop = start + count as i64 - 1;
        self.kv
            .list_range(&keys::record_index(user_id), start, stop)
            .await
    }

    /// Every record id in the user's index.
    pub async fn full_index(&self, user_id: &str) -> Result<Vec<String>, StoreError> {
        self.kv.list_range(&keys::record_index(user_id), 0, -1).await
    }

    /// Fetch records by id, preserving order.
    ///
    /// Ids whose record has expired or fails to decode are skipped.
    pub async fn get_records(
        &self,
        user_id: &str,
        record_ids: &[String],
    ) -> Result<Vec<HealthRecord>, StoreError> {
        let fetched: Vec<Option<HealthRecord>> = stream::iter(record_ids.iter().cloned())
            .map(|id| {
                let store = self.clone();
                let user_id = user_id.to_string();
                async move {
                    match store.get_record(&user_id, &id).await {
                        Ok(record) => Ok(record),
                        Err(StoreError::Corrupt { key, reason }) => {
                            tracing::warn!(key = %key, reason = %reason, "Skipping corrupt record");
                            Ok(None)
                        }
                        Err(e) => Err(e),
                    }
                }
            })
            .buffered(MAX_CONCURRENT_DB_OPS)
            .try_collect()
            .await?;

        Ok(fetched.into_iter().flatten().collect())
    }

    /// Record the write and invalidate the stats for its type.
    pub async fn insert_record(&self, record: &HealthRecord) -> Result<(), StoreError> {
        self.put_record(record).await?;
        self.append_to_index(&record.user_id, &record.id).await?;
        self.invalidate_stats(&record.user_id, record.record_type)
            .await?;
        Ok(())
    }

    /// Delete a record and its index entry.
    ///
    /// Returns the type of the removed record, or `None` if it was already gone.
    pub async fn remove_record(
        &self,
        user_id: &str,
        record_id: &str,
    ) -> Result<Option<RecordType>, StoreError> {
        let record_type = match self.get_record(user_id, record_id).await {
            Ok(record) => record.map(|r| r.record_type),
            Err(StoreError::Corrupt { .. }) => None,
            Err(e) => return Err(e),
        };

        self.delete_record(user_id, record_id).await?;
        self.remove_from_index(user_id, record_id).await?;

        if let Some(record_type) = record_type {
            self.invalidate_stats(user_id, record_type).await?;
        }
        Ok(record_type)
    }

    // ─── Stats cache ────────────────────────────────────────────

    pub async fn get_cached_stats(
        &self,
        user_id: &str,
        record_type: RecordType,
    ) -> Result<Option<HealthStats>, StoreError> {
        self.get_json(&keys::stats(user_id, record_type.as_str()))
            .await
    }

    pub async fn put_cached_stats(&self, stats: &HealthStats) -> Result<(), StoreError> {
        self.put_json(
            &keys::stats(&stats.user_id, stats.record_type.as_str()),
            stats,
            STATS_TTL,
        )
        .await
    }

    /// Drop the cached aggregate so the next read recomputes it.
    pub async fn invalidate_stats(
        &self,
        user_id: &str,
        record_type: RecordType,
    ) -> Result<(), StoreError> {
        self.kv
            .delete(&keys::stats(user_id, record_type.as_str()))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use chrono::Utc;

    fn store() -> (RecordStore, MemoryStore) {
        let mem = MemoryStore::new();
        (RecordStore::new(Arc::new(mem.clone())), mem)
    }

    fn record(user_id: &str, id: &str, record_type: RecordType, value: f64) -> HealthRecord {
        let now = Utc::now();
        HealthRecord {
            id: id.to_string(),
            user_id: user_id.to_string(),
            record_type,
            value,
            unit: "bpm".to_string(),
            notes: None,
            recorded_at: now,
            created_at: now,
        }
    }

    fn user(email: &str, id: &str) -> User {
        let now = Utc::now();
        User {
            id: id.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            full_name: "Test User".to_string(),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_user_is_exclusive() {
        let (store, _) = store();
        assert!(store.create_user(&user("a@example.com", "u1")).await.unwrap());
        assert!(!store.create_user(&user("a@example.com", "u2")).await.unwrap());

        let stored = store.get_user("a@example.com").await.unwrap().unwrap();
        assert_eq!(stored.id, "u1");
        assert!(store.user_exists("a@example.com").await.unwrap());
        assert!(!store.user_exists("b@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_range_index_newest_first_and_capped() {
        let (store, _) = store();
        for i in 0..120 {
            store.append_to_index("u1", &format!("r{i}")).await.unwrap();
        }

        let page = store.range_index("u1", 0, 1000).await.unwrap();
        assert_eq!(page.len(), MAX_PAGE_SIZE);
        assert_eq!(page[0], "r119");

        let page = store.range_index("u1", 110, 20).await.unwrap();
        assert_eq!(page.len(), 10);
        assert_eq!(page.last().unwrap(), "r0");

        assert!(store.range_index("u1", 0, 0).await.unwrap().is_empty());
        assert_eq!(store.full_index("u1").await.unwrap().len(), 120);
    }

    #[tokio::test]
    async fn test_get_records_skips_missing_and_corrupt() {
        let (store, mem) = store();
        store
            .insert_record(&record("u1", "a", RecordType::Weight, 80.0))
            .await
            .unwrap();
        store
            .insert_record(&record("u1", "b", RecordType::Weight, 81.0))
            .await
            .unwrap();
        mem.set(&keys::record("u1", "c"), "{not json", RECORD_TTL)
            .await
            .unwrap();

        let ids = vec![
            "b".to_string(),
            "missing".to_string(),
            "c".to_string(),
            "a".to_string(),
        ];
        let records = store.get_records("u1", &ids).await.unwrap();
        let got: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(got, ["b", "a"]);
    }

    #[tokio::test]
    async fn test_insert_record_invalidates_matching_stats_only() {
        let (store, _) = store();
        let weight = HealthStats::empty("u1", RecordType::Weight);
        let glucose = HealthStats::empty("u1", RecordType::Glucose);
        store.put_cached_stats(&weight).await.unwrap();
        store.put_cached_stats(&glucose).await.unwrap();

        store
            .insert_record(&record("u1", "a", RecordType::Weight, 80.0))
            .await
            .unwrap();

        assert!(store
            .get_cached_stats("u1", RecordType::Weight)
            .await
            .unwrap()
            .is_none());
        assert_eq!(
            store
                .get_cached_stats("u1", RecordType::Glucose)
                .await
                .unwrap(),
            Some(glucose)
        );
    }

    #[tokio::test]
    async fn test_remove_record() {
        let (store, _) = store();
        store
            .insert_record(&record("u1", "a", RecordType::HeartRate, 70.0))
            .await
            .unwrap();
        store
            .insert_record(&record("u1", "b", RecordType::HeartRate, 72.0))
            .await
            .unwrap();
        store
            .put_cached_stats(&HealthStats::empty("u1", RecordType::HeartRate))
            .await
            .unwrap();

        let removed = store.remove_record("u1", "a").await.unwrap();
        assert_eq!(removed, Some(RecordType::HeartRate));
        assert_eq!(store.full_index("u1").await.unwrap(), ["b"]);
        assert!(store.get_record("u1", "a").await.unwrap().is_none());
        assert!(store
            .get_cached_stats("u1", RecordType::HeartRate)
            .await
            .unwrap()
            .is_none());

        assert_eq!(store.remove_record("u1", "a").await.unwrap(), None);
        assert_eq!(store.full_index("u1").await.unwrap(), ["b"]);
    }

    #[tokio::test]
    async fn test_records_are_scoped_by_user() {
        let (store, _) = store();
        store
            .insert_record(&record("u1", "a", RecordType::Weight, 80.0))
            .await
            .unwrap();

        assert!(store.get_record("u2", "a").await.unwrap().is_none());
        assert!(store.full_index("u2").await.unwrap().is_empty());
        assert_eq!(store.remove_record("u2", "a").await.unwrap(), None);
        assert!(store.get_record("u1", "a").await.unwrap().is_some());
    }
}
